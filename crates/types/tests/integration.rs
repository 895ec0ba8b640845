//! Integration tests for types

#[cfg(test)]
mod tests {
    use dotstrap_types::*;

    #[test]
    fn test_plan_report_json_shape() {
        let report = PlanReport {
            config: Some("config.yaml".to_string()),
            workspace: Some("/home/me/workspace".to_string()),
            defaulted: true,
            steps: vec![PlanEntry {
                index: 1,
                label: "Run initializer".to_string(),
                fatal: true,
                action: "uv run src/init.py --config config.yaml".to_string(),
            }],
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["defaulted"], true);
        assert_eq!(value["steps"][0]["label"], "Run initializer");
        assert_eq!(value["steps"][0]["fatal"], true);
    }

    #[test]
    fn test_failed_step_marks_run_unsuccessful() {
        let report = RunReport {
            run_id: Uuid::new_v4(),
            config: None,
            workspace: None,
            steps: vec![StepReport {
                label: "Generate completions".to_string(),
                status: StepStatus::Failed,
                detail: Some("exit status 2".to_string()),
                duration_ms: 3,
            }],
            duration_ms: 3,
        };
        assert!(!report.is_success());

        let json = serde_json::to_string(&report).unwrap();
        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run_id, report.run_id);
        assert_eq!(back.steps[0].status, StepStatus::Failed);
    }

    #[test]
    fn test_output_preferences_deserialize_lowercase() {
        let format: OutputFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, OutputFormat::Json);
        let color: ColorChoice = serde_json::from_str("\"never\"").unwrap();
        assert_eq!(color, ColorChoice::Never);
        assert_eq!(OutputFormat::default(), OutputFormat::Tty);
    }

    #[test]
    fn test_sync_summary_display() {
        let summary = SyncSummary {
            files_copied: 2,
            files_unchanged: 5,
            symlinks_written: 1,
            dirs_created: 0,
            pruned: 0,
        };
        assert_eq!(
            summary.to_string(),
            "2 copied, 5 unchanged, 1 symlinks, 0 dirs created, 0 pruned"
        );
    }
}
