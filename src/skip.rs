//! Decides which template tree entries are left out of a generated project.
//!
//! Feature toggles map to file name (or tree relative path) patterns in a
//! single ordered table. Patterns are compiled once into [`GlobSet`]s.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;

use crate::config::{Bootstrap, Config};
use crate::constants::SKIP_DIRS;
use crate::error::{Error, Result};

/// Outcome of the skip check for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDecision {
    /// Generate the entry.
    Keep,
    /// Leave this entry out; keep walking its siblings and children.
    SkipEntry,
    /// Leave this directory and everything below it out.
    SkipSubtree,
}

impl SkipDecision {
    pub fn is_skipped(self) -> bool {
        self != SkipDecision::Keep
    }
}

/// What a rule's patterns are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    FileName,
    /// Path relative to the template tree root.
    RelativePath,
}

struct RuleDef {
    name: &'static str,
    target: Target,
    patterns: &'static [&'static str],
    skip_when: fn(&Config) -> bool,
}

/// Evaluated in order; a matching rule only skips when its toggle says so.
const RULES: [RuleDef; 7] = [
    RuleDef {
        name: "readme",
        target: Target::FileName,
        patterns: &["README.md", "README.md.tmpl"],
        skip_when: |c| c.no_readme,
    },
    RuleDef {
        name: "sessions",
        target: Target::RelativePath,
        patterns: &["app/sessions.go.tmpl"],
        skip_when: |c| c.no_sessions,
    },
    RuleDef {
        name: "gitignore",
        target: Target::FileName,
        patterns: &[".gitignore", ".gitignore.tmpl"],
        skip_when: |c| c.no_git_ignore,
    },
    RuleDef {
        name: "config",
        target: Target::FileName,
        patterns: &["cnf.toml", "cnf.toml.tmpl"],
        skip_when: |c| c.no_config,
    },
    RuleDef {
        name: "font-awesome",
        target: Target::FileName,
        patterns: &["font-awesome*", "fontawesome-webfont*", "FontAwesome.otf"],
        skip_when: |c| c.no_font_awesome,
    },
    RuleDef {
        name: "bootstrap",
        target: Target::FileName,
        patterns: &["bootstrap*"],
        skip_when: |c| c.bootstrap == Bootstrap::None,
    },
    RuleDef {
        name: "bootstrap-js",
        target: Target::FileName,
        patterns: &["bootstrap*.js"],
        skip_when: |c| c.no_bootstrap_js,
    },
];

struct SkipRule {
    name: &'static str,
    target: Target,
    matcher: GlobSet,
    skip_when: fn(&Config) -> bool,
}

/// The compiled skip rule table.
pub struct SkipRules {
    rules: Vec<SkipRule>,
}

impl SkipRules {
    /// Compiles the rule table.
    ///
    /// # Errors
    /// * `Error::ConfigError` if a pattern fails to compile
    pub fn new() -> Result<Self> {
        let rules = RULES
            .iter()
            .map(|def| {
                let mut builder = GlobSetBuilder::new();
                for pattern in def.patterns {
                    builder.add(Glob::new(pattern).map_err(|e| {
                        Error::ConfigError(format!("skip rule '{}': {}", def.name, e))
                    })?);
                }
                let matcher = builder.build().map_err(|e| {
                    Error::ConfigError(format!("skip rule '{}': {}", def.name, e))
                })?;
                Ok(SkipRule {
                    name: def.name,
                    target: def.target,
                    matcher,
                    skip_when: def.skip_when,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Decides whether `entry_path` (inside `tree_root`) is generated.
    ///
    /// The tree root itself is always skipped, excluded directories are skipped
    /// together with their contents, and files go through the rule table.
    pub fn decide(
        &self,
        config: &Config,
        tree_root: &Path,
        entry_path: &Path,
        is_dir: bool,
    ) -> SkipDecision {
        if entry_path == tree_root {
            return SkipDecision::SkipEntry;
        }

        let Some(file_name) = entry_path.file_name() else {
            return SkipDecision::Keep;
        };

        if is_dir {
            if SKIP_DIRS.iter().any(|dir| file_name == *dir) {
                debug!("Skipping directory {} and its contents", entry_path.display());
                return SkipDecision::SkipSubtree;
            }
            return SkipDecision::Keep;
        }

        let relative = entry_path.strip_prefix(tree_root).unwrap_or(entry_path);
        for rule in &self.rules {
            let candidate = match rule.target {
                Target::FileName => Path::new(file_name),
                Target::RelativePath => relative,
            };
            if rule.matcher.is_match(candidate) && (rule.skip_when)(config) {
                debug!("Skipping {} ({} rule)", entry_path.display(), rule.name);
                return SkipDecision::SkipEntry;
            }
        }

        SkipDecision::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_compile() {
        let rules = SkipRules::new().unwrap();
        assert_eq!(rules.rules.len(), RULES.len());
    }

    #[test]
    fn test_bootstrap_js_reaches_its_own_rule() {
        let rules = SkipRules::new().unwrap();
        let root = Path::new("/templates");
        let js = Path::new("/templates/assets/js/bootstrap.min.js");

        let mut config = Config { bootstrap: Bootstrap::Regular, ..Default::default() };
        assert_eq!(rules.decide(&config, root, js, false), SkipDecision::Keep);

        config.no_bootstrap_js = true;
        assert_eq!(rules.decide(&config, root, js, false), SkipDecision::SkipEntry);

        config.no_bootstrap_js = false;
        config.bootstrap = Bootstrap::None;
        assert_eq!(rules.decide(&config, root, js, false), SkipDecision::SkipEntry);
    }

    #[test]
    fn test_directories_only_match_exclusions() {
        let rules = SkipRules::new().unwrap();
        let config = Config { no_readme: true, bootstrap: Bootstrap::None, ..Default::default() };
        let root = Path::new("/templates");

        assert_eq!(
            rules.decide(&config, root, Path::new("/templates/bootstrap"), true),
            SkipDecision::Keep
        );
        assert_eq!(
            rules.decide(&config, root, Path::new("/templates/nested/i18n"), true),
            SkipDecision::SkipSubtree
        );
        // A file that happens to be called i18n is not an excluded directory.
        assert_eq!(
            rules.decide(&config, root, Path::new("/templates/i18n"), false),
            SkipDecision::Keep
        );
    }
}
