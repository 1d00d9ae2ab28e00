// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property tests for termination classification.

use jal_core::{Outcome, Termination};
use proptest::prelude::*;

proptest! {
    #[test]
    fn only_zero_is_normal(code in any::<i32>()) {
        let t = Termination::Exited { code };
        prop_assert_eq!(t.is_normal(), code == 0);
    }

    #[test]
    fn failure_branch_never_exits_zero(code in any::<i32>().prop_filter("non-zero", |c| *c != 0)) {
        let outcome = Outcome::Failure {
            termination: Termination::Exited { code },
            acknowledged: true,
        };
        prop_assert_ne!(outcome.exit_code(), 0);
        prop_assert_eq!(outcome.exit_code(), code);
    }

    #[test]
    fn signals_and_launch_failures_are_abnormal(signal in proptest::option::of(1i32..64), reason in ".*") {
        let signalled = Termination::Signalled { signal };
        let failed = Termination::LaunchFailed { reason };
        prop_assert!(!signalled.is_normal());
        prop_assert!(!failed.is_normal());
        prop_assert_ne!(signalled.launcher_exit_code(), 0);
        prop_assert_ne!(failed.launcher_exit_code(), 0);
    }
}
