use super::try_parse_timestamp_ms;
use crate::record::null_as_default;
use serde::{Deserialize, Serialize};

/// A server entry as listed by the time-series endpoint: one row per
/// hostname, protocol and drive model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub hostname: String,
    pub protocol: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub drive_model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub test_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_test_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_test_time: String,
}

/// Servers merged by `hostname::protocol`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerGroup {
    pub id: String,
    pub hostname: String,
    pub protocol: String,
    pub drive_models: Vec<String>,
    pub total_tests: u64,
    pub first_test_time: String,
    pub last_test_time: String,
}

/// Replaces `current` with `candidate` when the candidate is a readable time
/// and `current` is not, or when `better` prefers the candidate.
fn widen(current: &mut String, candidate: &str, better: fn(i64, i64) -> bool) {
    let Some(candidate_ms) = try_parse_timestamp_ms(candidate) else {
        return;
    };

    let replace = match try_parse_timestamp_ms(current) {
        Some(current_ms) => better(candidate_ms, current_ms),
        None => true,
    };

    if replace {
        *current = candidate.to_string();
    }
}

/// Merges server entries sharing hostname and protocol. Test counts add up
/// and the time span widens to cover every member. Groups keep the order in
/// which their first member appears. Empty or unreadable member times leave
/// the span untouched.
pub fn group_servers(servers: &[ServerInfo]) -> Vec<ServerGroup> {
    let mut groups: Vec<ServerGroup> = Vec::new();

    for server in servers {
        let id = format!("{}::{}", server.hostname, server.protocol);

        let group = match groups.iter().position(|g| g.id == id) {
            Some(index) => &mut groups[index],
            None => {
                groups.push(ServerGroup {
                    id,
                    hostname: server.hostname.clone(),
                    protocol: server.protocol.clone(),
                    drive_models: Vec::new(),
                    total_tests: 0,
                    first_test_time: String::new(),
                    last_test_time: String::new(),
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };

        if !server.drive_model.is_empty() && !group.drive_models.contains(&server.drive_model) {
            group.drive_models.push(server.drive_model.clone());
        }

        group.total_tests += server.test_count;

        widen(&mut group.first_test_time, &server.first_test_time, |a, b| a < b);
        widen(&mut group.last_test_time, &server.last_test_time, |a, b| a > b);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(
        host: &str,
        protocol: &str,
        drive: &str,
        count: u64,
        first: &str,
        last: &str,
    ) -> ServerInfo {
        ServerInfo {
            hostname: host.to_string(),
            protocol: protocol.to_string(),
            drive_model: drive.to_string(),
            test_count: count,
            first_test_time: first.to_string(),
            last_test_time: last.to_string(),
        }
    }

    #[test]
    fn merges_by_host_and_protocol() {
        let servers = vec![
            server("h1", "NVMe", "A", 3, "2025-02-01T00:00:00", "2025-03-01T00:00:00"),
            server("h1", "iSCSI", "A", 1, "2025-01-15T00:00:00", "2025-01-15T00:00:00"),
            server("h1", "NVMe", "B", 4, "2025-01-01T00:00:00", "2025-02-15T00:00:00"),
            server("h1", "NVMe", "A", 2, "2025-02-10T00:00:00", "2025-04-01T00:00:00"),
        ];

        let groups = group_servers(&servers);

        assert_eq!(groups.len(), 2);

        let nvme = &groups[0];
        assert_eq!(nvme.id, "h1::NVMe");
        assert_eq!(nvme.drive_models, vec!["A", "B"]);
        assert_eq!(nvme.total_tests, 9);
        assert_eq!(nvme.first_test_time, "2025-01-01T00:00:00");
        assert_eq!(nvme.last_test_time, "2025-04-01T00:00:00");

        assert_eq!(groups[1].id, "h1::iSCSI");
        assert_eq!(groups[1].total_tests, 1);
    }

    #[test]
    fn missing_times_leave_span_alone() {
        let servers = vec![
            server("h1", "NVMe", "A", 1, "", ""),
            server("h1", "NVMe", "A", 2, "2025-01-01T00:00:00", "2025-02-01T00:00:00"),
            server("h1", "NVMe", "B", 1, "not a time", ""),
            server("h2", "NVMe", "A", 1, "2025-03-01T00:00:00", "2025-03-02T00:00:00"),
            server("h2", "NVMe", "B", 1, "", ""),
            server("h3", "NVMe", "A", 1, "", ""),
        ];

        let groups = group_servers(&servers);

        assert_eq!(groups[0].first_test_time, "2025-01-01T00:00:00");
        assert_eq!(groups[0].last_test_time, "2025-02-01T00:00:00");
        assert_eq!(groups[0].total_tests, 4);

        assert_eq!(groups[1].first_test_time, "2025-03-01T00:00:00");
        assert_eq!(groups[1].last_test_time, "2025-03-02T00:00:00");

        assert_eq!(groups[2].first_test_time, "");
        assert_eq!(groups[2].last_test_time, "");
    }

    #[test]
    fn null_row_fields_decode_to_defaults() {
        let json = r#"[{"hostname":"h1","protocol":"NVMe","drive_model":null,"test_count":null,
            "first_test_time":null,"last_test_time":"2025-01-02T00:00:00"}]"#;
        let servers: Vec<ServerInfo> = serde_json::from_str(json).unwrap();

        let groups = group_servers(&servers);
        assert!(groups[0].drive_models.is_empty());
        assert_eq!(groups[0].total_tests, 0);
        assert_eq!(groups[0].first_test_time, "");
        assert_eq!(groups[0].last_test_time, "2025-01-02T00:00:00");
    }

    #[test]
    fn decodes_endpoint_rows() {
        let json = r#"[{"hostname":"h1","protocol":"NVMe","drive_model":"A","test_count":5,
            "last_test_time":"2025-01-02T00:00:00","first_test_time":"2025-01-01T00:00:00"}]"#;
        let servers: Vec<ServerInfo> = serde_json::from_str(json).unwrap();

        let groups = group_servers(&servers);
        let out = serde_json::to_value(&groups).unwrap();
        assert_eq!(out[0]["totalTests"], 5);
        assert_eq!(out[0]["driveModels"][0], "A");
    }

    #[test]
    fn empty_input() {
        assert!(group_servers(&[]).is_empty());
    }
}
