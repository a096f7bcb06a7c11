//! Property tests for query command construction

use proptest::prelude::*;

use gerritpoll_core::{PollSettings, TriggerParameters, build_query_command};

fn params() -> TriggerParameters {
    TriggerParameters::new("gerrit", "review.example.com").unwrap()
}

proptest! {
    /// Property: every command carries the fixed required clauses, whatever
    /// the filters look like
    #[test]
    fn required_clauses_are_always_present(
        project in ".{0,30}",
        branch in ".{0,30}",
    ) {
        let params = params().with_project(&project).with_branch(&branch);
        let command = build_query_command(&params, &PollSettings::default());

        prop_assert!(command.starts_with("gerrit query"));
        prop_assert!(command.contains("--format=JSON"));
        prop_assert!(command.contains("status:open"));
        prop_assert!(command.contains("limit:10"));
        prop_assert!(command.ends_with("--current-patch-set"));
    }

    /// Property: a non-blank project filter appears trimmed in the command
    #[test]
    fn non_blank_project_appears_trimmed(
        project in "[A-Za-z][A-Za-z0-9/_.-]{0,20}",
        pad_left in " {0,3}",
        pad_right in " {0,3}",
    ) {
        let padded = format!("{pad_left}{project}{pad_right}");
        let params = params().with_project(&padded);
        let command = build_query_command(&params, &PollSettings::default());

        let needle = format!("project:{project}");
        prop_assert!(command.contains(&needle));
    }

    /// Property: blank filters never produce filter clauses
    #[test]
    fn blank_filters_produce_no_clauses(
        project in " {0,10}",
        branch in "[ \t]{0,10}",
    ) {
        let params = params().with_project(&project).with_branch(&branch);
        let command = build_query_command(&params, &PollSettings::default());

        prop_assert!(!command.contains("project:"));
        prop_assert!(!command.contains("branch:"));
    }

    /// Property: with case folding enabled the command never contains
    /// uppercase filter text
    #[test]
    fn case_folding_lowercases_filters(
        project in "[A-Za-z]{1,20}",
    ) {
        let params = params().with_project(&project);
        let settings = PollSettings {
            case_insensitive_filters: true,
            ..Default::default()
        };
        let command = build_query_command(&params, &settings);

        let needle = format!("project:{}", project.to_lowercase());
        prop_assert!(command.contains(&needle));
    }

    /// Property: building the same command twice is deterministic
    #[test]
    fn command_is_deterministic(
        project in ".{0,20}",
        branch in ".{0,20}",
    ) {
        let params = params().with_project(&project).with_branch(&branch);
        let settings = PollSettings::default();

        prop_assert_eq!(
            build_query_command(&params, &settings),
            build_query_command(&params, &settings)
        );
    }
}
