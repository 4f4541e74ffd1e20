//! Robots.txt parser
//!
//! Deliberately simple matching: a path is blocked when it starts with any
//! `Disallow` prefix of a matching group, unless it also starts with any
//! `Allow` prefix of a matching group. Prefix length plays no part, so a
//! short `Allow: /` beats a longer `Disallow: /private`.

/// One `User-agent` group and its rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RuleGroup {
    agents: Vec<String>,
    allow: Vec<String>,
    disallow: Vec<String>,
}

impl RuleGroup {
    fn applies_to(&self, user_agent: &str) -> bool {
        self.agents
            .iter()
            .any(|agent| agent == "*" || agent.eq_ignore_ascii_case(user_agent))
    }
}

/// Parsed robots.txt rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRobots {
    groups: Vec<RuleGroup>,
}

impl ParsedRobots {
    /// Parses raw robots.txt content
    ///
    /// Unknown directives, comments and malformed lines are skipped.
    /// Consecutive `User-agent` lines share the rules that follow them.
    pub fn from_content(content: &str) -> Self {
        let mut groups: Vec<RuleGroup> = Vec::new();
        let mut current = RuleGroup::default();
        let mut in_agent_lines = false;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !in_agent_lines && !current.agents.is_empty() {
                        groups.push(std::mem::take(&mut current));
                    }
                    current.agents.push(value.to_string());
                    in_agent_lines = true;
                }
                "allow" | "disallow" => {
                    in_agent_lines = false;
                    // Rules before any User-agent line belong to no group
                    if current.agents.is_empty() || value.is_empty() {
                        continue;
                    }
                    if key == "allow" {
                        current.allow.push(value.to_string());
                    } else {
                        current.disallow.push(value.to_string());
                    }
                }
                _ => in_agent_lines = false,
            }
        }

        if !current.agents.is_empty() {
            groups.push(current);
        }

        Self { groups }
    }

    /// Creates a permissive ParsedRobots that allows everything
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks if a path is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `path` - The URL path to check (e.g., "/page.html")
    /// * `user_agent` - The full user agent string; groups match on `*` or an exact
    ///   (case-insensitive) name
    pub fn is_allowed(&self, path: &str, user_agent: &str) -> bool {
        let mut disallowed = false;
        let mut allowed = false;

        for group in self.groups.iter().filter(|g| g.applies_to(user_agent)) {
            disallowed |= group.disallow.iter().any(|p| path.starts_with(p.as_str()));
            allowed |= group.allow.iter().any(|p| path.starts_with(p.as_str()));
        }

        !disallowed || allowed
    }
}
