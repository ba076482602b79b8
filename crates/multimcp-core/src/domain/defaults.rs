//! Default seed entries.

use super::ServerConfig;
use std::collections::BTreeMap;

/// Entries seeded into an empty registry on first start.
///
/// These names become protected: they can be updated but never deleted.
pub fn default_servers() -> BTreeMap<String, ServerConfig> {
    let mut servers = BTreeMap::new();

    servers.insert(
        "search-server".to_string(),
        ServerConfig::new("search-server", Vec::new())
            .with_env(BTreeMap::new())
            .with_disabled(false),
    );

    servers.insert(
        "git-server".to_string(),
        ServerConfig::new(
            "docker",
            [
                "run",
                "--rm",
                "-i",
                "--mount",
                "type=bind,src=.,dst=/repo",
                "mcp/git",
                "--repository",
                "/repo",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        )
        .with_disabled(false)
        .with_auto_approve(vec![
            "git_create_branch".to_string(),
            "git_diff_staged".to_string(),
        ]),
    );

    servers
}
