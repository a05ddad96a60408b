use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub workspace: Workspace,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub browser: BrowserOptions,
    #[serde(default)]
    pub timeouts: Timeouts,
    #[serde(default)]
    pub duplicates: Duplicates,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global: Default::default(),
            workspace: Default::default(),
            auth: Default::default(),
            browser: Default::default(),
            timeouts: Default::default(),
            duplicates: Default::default(),
            logging: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Global {
    /// Name of the progress file kept inside the source directory.
    pub progress_filename: String,
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            progress_filename: "progress.json".into(),
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    /// Workspace subdomain; the gallery URL is derived from it.
    pub name: String,
    /// Full gallery URL override. Takes precedence over `name` when set.
    pub emoji_url: String,
}
impl Default for Workspace {
    fn default() -> Self {
        Self {
            name: "".into(),
            emoji_url: "".into(),
        }
    }
}

impl Workspace {
    pub fn emoji_page_url(&self) -> Result<String> {
        if !self.emoji_url.is_empty() {
            return Ok(self.emoji_url.clone());
        }
        if self.name.is_empty() {
            return Err(anyhow!(
                "no workspace configured: set workspace.name or workspace.emoji_url"
            ));
        }
        Ok(format!("https://{}.slack.com/customize/emoji", self.name))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auth {
    /// Environment variable holding the sign-in email.
    pub email_env: String,
    /// Environment variable holding the sign-in password.
    pub password_env: String,
    /// How long to wait for the gallery to appear after submitting sign-in.
    pub login_timeout_seconds: u64,
}
impl Default for Auth {
    fn default() -> Self {
        Self {
            email_env: "EMOJI_EMAIL".into(),
            password_env: "EMOJI_PASSWORD".into(),
            login_timeout_seconds: 180,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserOptions {
    /// Chrome executable path, or "auto" to probe well-known locations.
    pub chrome_exe: String,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Extra Chrome command-line arguments.
    pub chrome_args: Vec<String>,
}
impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            chrome_exe: "auto".into(),
            headless: true,
            window_width: 1280,
            window_height: 1080,
            chrome_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeouts {
    /// Short window after submission in which a duplicate preview may appear.
    pub duplicate_check_ms: u64,
    /// Long window for the save round trip to settle.
    pub save_seconds: u64,
    /// Per-element wait when driving the form.
    pub element_seconds: u64,
    /// Polling interval for element presence checks.
    pub poll_ms: u64,
}
impl Default for Timeouts {
    fn default() -> Self {
        Self {
            duplicate_check_ms: 250,
            save_seconds: 60,
            element_seconds: 10,
            poll_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Duplicates {
    /// "record": record the duplicate and move on.
    /// "rename-once": append the type suffix again and resubmit, once.
    pub policy: String,
}
impl Default for Duplicates {
    fn default() -> Self {
        Self {
            policy: "record".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    Record,
    RenameOnce,
}

impl Duplicates {
    pub fn parse_policy(&self) -> Result<DuplicatePolicy> {
        match self.policy.as_str() {
            "record" => Ok(DuplicatePolicy::Record),
            "rename-once" => Ok(DuplicatePolicy::RenameOnce),
            other => Err(anyhow!(
                "unknown duplicates.policy: {other} (expected \"record\" or \"rename-once\")"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            file_path: "".into(),
        }
    }
}

/// Sign-in identity, resolved once at startup from the env vars named in
/// `[auth]`. Nothing below the CLI layer touches the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn resolve(auth: &Auth) -> Result<Self> {
        let email = std::env::var(&auth.email_env)
            .with_context(|| format!("missing credential env var: {}", auth.email_env))?;
        let password = std::env::var(&auth.password_env)
            .with_context(|| format!("missing credential env var: {}", auth.password_env))?;
        Ok(Self { email, password })
    }

    pub fn present(auth: &Auth) -> bool {
        std::env::var(&auth.email_env).is_ok() && std::env::var(&auth.password_env).is_ok()
    }
}
