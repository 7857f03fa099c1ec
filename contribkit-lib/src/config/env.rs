use super::Config;
use crate::Result;
use camino::Utf8PathBuf;
use core::str::FromStr;
use ohno::app_err;

impl Config {
    /// Overlay settings from the process environment.
    pub fn apply_process_env(&mut self) -> Result<()> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Overlay settings from environment variables read through `lookup`.
    ///
    /// A set variable replaces the file's value. Empty variables are treated as unset.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |names: &[&str]| names.iter().find_map(|name| lookup(name).filter(|v| !v.is_empty()));

        if let Some(login) = var(&["CONTRIBKIT_GITHUB_LOGIN", "GITHUB_LOGIN"]) {
            self.login = Some(login);
        }

        if let Some(token) = var(&["CONTRIBKIT_GITHUB_TOKEN", "GITHUB_TOKEN"]) {
            self.token = Some(token);
        }

        if let Some(dir) = var(&["CONTRIBKIT_DIR"]) {
            self.output_dir = Utf8PathBuf::from(dir);
        }

        let contributions = &mut self.github_contributions;
        if let Some(login) = var(&["CONTRIBKIT_GITHUB_CONTRIBUTIONS_LOGIN"]) {
            contributions.login = Some(login);
        }
        if let Some(token) = var(&["CONTRIBKIT_GITHUB_CONTRIBUTIONS_TOKEN"]) {
            contributions.token = Some(token);
        }
        if let Some(max) = var(&["CONTRIBKIT_GITHUB_CONTRIBUTIONS_MAX"]) {
            contributions.max_contributions = Some(parse_number("CONTRIBKIT_GITHUB_CONTRIBUTIONS_MAX", &max)?);
        }
        if let Some(flag) = var(&["CONTRIBKIT_GITHUB_CONTRIBUTIONS_LOG_SCALING"]) {
            contributions.logarithmic_scaling = parse_flag("CONTRIBKIT_GITHUB_CONTRIBUTIONS_LOG_SCALING", &flag)?;
        }

        let contributors = &mut self.github_contributors;
        if let Some(login) = var(&["CONTRIBKIT_GITHUB_CONTRIBUTORS_LOGIN"]) {
            contributors.login = Some(login);
        }
        if let Some(token) = var(&["CONTRIBKIT_GITHUB_CONTRIBUTORS_TOKEN"]) {
            contributors.token = Some(token);
        }
        if let Some(repo) = var(&["CONTRIBKIT_GITHUB_CONTRIBUTORS_REPO"]) {
            contributors.repo = Some(repo);
        }
        if let Some(min) = var(&["CONTRIBKIT_GITHUB_CONTRIBUTORS_MIN"]) {
            contributors.min_contributions = parse_number("CONTRIBKIT_GITHUB_CONTRIBUTORS_MIN", &min)?;
        }

        let gitlab = &mut self.gitlab_contributors;
        if let Some(token) = var(&["CONTRIBKIT_GITLAB_CONTRIBUTORS_TOKEN"]) {
            gitlab.token = Some(token);
        }
        if let Some(id) = var(&["CONTRIBKIT_GITLAB_CONTRIBUTORS_REPO_ID"]) {
            gitlab.repo_id = Some(parse_number("CONTRIBKIT_GITLAB_CONTRIBUTORS_REPO_ID", &id)?);
        }
        if let Some(min) = var(&["CONTRIBKIT_GITLAB_CONTRIBUTORS_MIN"]) {
            gitlab.min_contributions = parse_number("CONTRIBKIT_GITLAB_CONTRIBUTORS_MIN", &min)?;
        }

        let crowdin = &mut self.crowdin_contributors;
        if let Some(token) = var(&["CONTRIBKIT_CROWDIN_TOKEN"]) {
            crowdin.token = Some(token);
        }
        if let Some(id) = var(&["CONTRIBKIT_CROWDIN_PROJECT_ID"]) {
            crowdin.project_id = Some(parse_number("CONTRIBKIT_CROWDIN_PROJECT_ID", &id)?);
        }
        if let Some(min) = var(&["CONTRIBKIT_CROWDIN_MIN_TRANSLATIONS"]) {
            crowdin.min_translations = parse_number("CONTRIBKIT_CROWDIN_MIN_TRANSLATIONS", &min)?;
        }

        Ok(())
    }
}

fn parse_number<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| app_err!("environment variable {name} has invalid value '{value}': {e}"))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(app_err!("environment variable {name} has invalid value '{value}': expected true or false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn apply(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        let mut config = Config::default();
        config.apply_env(|name| vars.get(name).cloned())?;
        Ok(config)
    }

    #[test]
    fn test_no_variables_leaves_config_untouched() {
        assert_eq!(apply(&[]).unwrap(), Config::default());
    }

    #[test]
    fn test_prefixed_variable_wins_over_generic() {
        let config = apply(&[("CONTRIBKIT_GITHUB_TOKEN", "scoped"), ("GITHUB_TOKEN", "generic")]).unwrap();
        assert_eq!(config.token.as_deref(), Some("scoped"));

        let config = apply(&[("GITHUB_LOGIN", "octocat")]).unwrap();
        assert_eq!(config.login.as_deref(), Some("octocat"));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let config = apply(&[("CONTRIBKIT_GITHUB_TOKEN", ""), ("GITHUB_TOKEN", "generic"), ("CONTRIBKIT_DIR", "")]).unwrap();
        assert_eq!(config.token.as_deref(), Some("generic"));
        assert_eq!(config.output_dir, "./contribkit");
    }

    #[test]
    fn test_section_variables() {
        let config = apply(&[
            ("CONTRIBKIT_GITHUB_CONTRIBUTIONS_LOGIN", "octocat"),
            ("CONTRIBKIT_GITHUB_CONTRIBUTIONS_MAX", "12.5"),
            ("CONTRIBKIT_GITHUB_CONTRIBUTIONS_LOG_SCALING", "TRUE"),
            ("CONTRIBKIT_GITHUB_CONTRIBUTORS_REPO", "contribkit"),
            ("CONTRIBKIT_GITHUB_CONTRIBUTORS_MIN", "3"),
            ("CONTRIBKIT_GITLAB_CONTRIBUTORS_REPO_ID", "4711"),
            ("CONTRIBKIT_GITLAB_CONTRIBUTORS_MIN", "2"),
            ("CONTRIBKIT_DIR", "out"),
        ])
        .unwrap();

        assert_eq!(config.github_contributions.login.as_deref(), Some("octocat"));
        assert_eq!(config.github_contributions.max_contributions, Some(12.5));
        assert!(config.github_contributions.logarithmic_scaling);
        assert_eq!(config.github_contributors.repo.as_deref(), Some("contribkit"));
        assert_eq!(config.github_contributors.min_contributions, 3);
        assert_eq!(config.gitlab_contributors.repo_id, Some(4711));
        assert_eq!(config.gitlab_contributors.min_contributions, 2);
        assert_eq!(config.output_dir, "out");
    }

    #[test]
    fn test_crowdin_variables() {
        let config = apply(&[
            ("CONTRIBKIT_CROWDIN_TOKEN", "crowdin-secret"),
            ("CONTRIBKIT_CROWDIN_PROJECT_ID", "512"),
            ("CONTRIBKIT_CROWDIN_MIN_TRANSLATIONS", "25"),
        ])
        .unwrap();

        assert_eq!(config.crowdin_contributors.token.as_deref(), Some("crowdin-secret"));
        assert_eq!(config.crowdin_contributors.project_id, Some(512));
        assert_eq!(config.crowdin_contributors.min_translations, 25);

        let err = apply(&[("CONTRIBKIT_CROWDIN_PROJECT_ID", "my-project")]).unwrap_err();
        assert!(err.to_string().contains("CONTRIBKIT_CROWDIN_PROJECT_ID"));
    }

    #[test]
    fn test_invalid_number_names_the_variable() {
        let err = apply(&[("CONTRIBKIT_GITLAB_CONTRIBUTORS_REPO_ID", "abc")]).unwrap_err();
        assert!(err.to_string().contains("CONTRIBKIT_GITLAB_CONTRIBUTORS_REPO_ID"));

        let err = apply(&[("CONTRIBKIT_GITHUB_CONTRIBUTIONS_LOG_SCALING", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("CONTRIBKIT_GITHUB_CONTRIBUTIONS_LOG_SCALING"));
    }
}
