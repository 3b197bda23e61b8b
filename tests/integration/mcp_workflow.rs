/// End-to-end tests: JSON-RPC in, SQLite-persisted stats out
use std::sync::Arc;

use chrono::NaiveDate;
use habit_stats_mcp::*;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

async fn server_on(path: std::path::PathBuf, today: NaiveDate) -> HabitStatsServer {
    HabitStatsServer::with_clock(path, TrackerConfig::default(), Arc::new(FixedClock::on(today)))
        .await
        .expect("Failed to create server")
}

fn jan(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

async fn call(mcp: &mut McpServer, id: u64, name: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    });
    let response = mcp
        .process_line(&request.to_string())
        .await
        .expect("tools/call should get a response");
    serde_json::to_value(response).unwrap()
}

fn text_of(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap_or_default()
}

#[cfg(test)]
mod mcp_workflow_tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_and_list_tools() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let mut mcp = McpServer::new(server_on(temp_file.path().to_path_buf(), jan(1)).await);

        let init = mcp
            .process_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        let init = serde_json::to_value(init).unwrap();
        assert_eq!(init["result"]["protocolVersion"], "2024-11-05");

        let ack = mcp
            .process_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(ack.is_none());
        assert!(mcp.is_initialized());

        let list = mcp
            .process_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .unwrap();
        let list = serde_json::to_value(list).unwrap();
        let tools = list["result"]["tools"].as_array().unwrap();
        let names: Vec<_> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            vec![
                "completion_toggle",
                "completion_status",
                "habit_delete",
                "stats_get",
                "achievements_list",
                "progress_month",
            ]
        );
        assert!(tools[0]["inputSchema"]["properties"]["habit_id"].is_object());
    }

    #[tokio::test]
    async fn test_toggle_then_read_stats() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let mut mcp = McpServer::new(server_on(temp_file.path().to_path_buf(), jan(3)).await);

        for (id, d) in [(1, "2024-01-01"), (2, "2024-01-02"), (3, "2024-01-03")] {
            let args = json!({"habit_id": "read", "date": d});
            let response = call(&mut mcp, id, "completion_toggle", args).await;
            assert_eq!(response["result"]["isError"], false);
        }

        let response = call(&mut mcp, 4, "completion_toggle", json!({"habit_id": "run"})).await;
        assert!(text_of(&response).contains("Marked run done for 2024-01-03"));

        let stats = call(&mut mcp, 5, "stats_get", json!({})).await;
        assert!(text_of(&stats).contains("Points: 40"));
        assert!(text_of(&stats).contains("Streak: 3 days"));

        let args = json!({"habit_id": "read", "date": "2024-01-02"});
        let status = call(&mut mcp, 6, "completion_status", args).await;
        assert!(text_of(&status).contains("is done"));
    }

    #[tokio::test]
    async fn test_first_toggle_announces_achievement() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let mut mcp = McpServer::new(server_on(temp_file.path().to_path_buf(), jan(1)).await);

        let response = call(&mut mcp, 1, "completion_toggle", json!({"habit_id": "read"})).await;
        assert!(text_of(&response).contains("Achievement unlocked: Getting Started"));

        let listed = call(&mut mcp, 2, "achievements_list", json!({"unlocked_only": true})).await;
        assert!(text_of(&listed).contains("Getting Started"));
        assert!(!text_of(&listed).contains("Century Club"));
    }

    #[tokio::test]
    async fn test_bad_arguments_are_tool_errors() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let mut mcp = McpServer::new(server_on(temp_file.path().to_path_buf(), jan(1)).await);

        let args = json!({"habit_id": "read", "date": "Jan 1"});
        let bad_date = call(&mut mcp, 1, "completion_toggle", args).await;
        assert_eq!(bad_date["result"]["isError"], true);
        assert!(text_of(&bad_date).contains("Invalid date"));

        let missing = call(&mut mcp, 2, "habit_delete", json!({})).await;
        assert_eq!(missing["result"]["isError"], true);

        let unknown = call(&mut mcp, 3, "habit_create", json!({})).await;
        assert!(text_of(&unknown).contains("Unknown tool"));

        let args = json!({"year": 2024, "month": 13});
        let bad_month = call(&mut mcp, 4, "progress_month", args).await;
        assert_eq!(bad_month["result"]["isError"], true);
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let mut mcp = McpServer::new(server_on(temp_file.path().to_path_buf(), jan(1)).await);

        let parse = serde_json::to_value(mcp.process_line("{oops").await.unwrap()).unwrap();
        assert_eq!(parse["error"]["code"], -32700);

        let request = r#"{"jsonrpc":"2.0","id":7,"method":"resources/list"}"#;
        let unknown = serde_json::to_value(mcp.process_line(request).await.unwrap()).unwrap();
        assert_eq!(unknown["error"]["code"], -32601);
        assert_eq!(unknown["id"], 7);

        assert!(mcp.process_line("   ").await.is_none());
    }

    #[tokio::test]
    async fn test_delete_habit_and_month_progress() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let mut mcp = McpServer::new(server_on(temp_file.path().to_path_buf(), jan(2)).await);

        let toggles = [("read", "2024-01-01"), ("run", "2024-01-01"), ("run", "2024-01-02")];
        for (id, (habit_id, date)) in (1..).zip(toggles) {
            let args = json!({"habit_id": habit_id, "date": date});
            call(&mut mcp, id, "completion_toggle", args).await;
        }

        let progress = call(&mut mcp, 4, "progress_month", json!({})).await;
        let expected = "2024-01: 3 of 62 possible completions (5%), 2 active days";
        assert!(text_of(&progress).contains(expected));

        let deleted = call(&mut mcp, 5, "habit_delete", json!({"habit_id": "run"})).await;
        assert!(text_of(&deleted).contains("Removed 2 completion records for run"));

        let stats = call(&mut mcp, 6, "stats_get", json!({})).await;
        assert!(text_of(&stats).contains("Points: 10"));
        assert!(text_of(&stats).contains("Best: 2 days"));
    }

    #[tokio::test]
    async fn test_stats_persist_across_restart() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        {
            let server = server_on(db_path.clone(), jan(2)).await;
            let orchestrator = server.orchestrator();
            orchestrator.toggle_completion(&HabitId::parse("read").unwrap(), jan(1)).await.unwrap();
            orchestrator.toggle_completion(&HabitId::parse("read").unwrap(), jan(2)).await.unwrap();
        }

        // A week later the streak has lapsed but the best run is remembered
        let server = server_on(db_path, jan(9)).await;
        let stats = server.orchestrator().recompute().await.unwrap();
        assert_eq!(stats.total_points, 20);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 2);
        assert!(stats.achievement(AchievementKind::FirstHabit).unwrap().is_unlocked());
    }

    #[test]
    fn test_storage_interface() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf())
            .expect("Failed to create storage");

        let _: &dyn StatsStore = &storage;
    }
}
