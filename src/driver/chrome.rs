use super::{FormDriver, types::*};
use crate::config::{BrowserOptions, Config, Credentials};
use anyhow::{Context, Result, anyhow};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const SIGN_IN_PASSWORD_LINK: &str = r#"[data-qa="sign_in_password_link"]"#;
const EMAIL_INPUT: &str = "#email";
const PASSWORD_INPUT: &str = "#password";
const SIGN_IN_BUTTON: &str = "#signin_btn";

const ADD_BUTTON: &str = r#"[data-qa="customize_emoji_add_button"]"#;
const FILE_INPUT: &str = r#"input[data-qa="customize_emoji_add_dialog_file_input"]"#;
const NAME_INPUT: &str = r#"[data-qa="customize_emoji_add_dialog_input"]"#;
const DUPLICATE_PREVIEW: &str = r#"[data-qa="customize_emoji_add_dialog_duplicate_preview"]"#;
const ERROR_BANNER: &str = r#"[data-qa="customize_emoji_add_dialog_error"]"#;
const SAVE_BUTTON: &str = r#"[data-qa="customize_emoji_add_dialog_go"]"#;
const CLOSE_MODAL: &str = r#"[data-qa="sk_close_modal_button"]"#;

/// A closing modal's overlay can linger above the add button and swallow
/// clicks; hide it for the whole session.
const HIDE_CLOSING_OVERLAY: &str = r#"
(() => {
  const style = document.createElement('style');
  style.textContent =
    '.ReactModal__Overlay.ReactModal__Overlay--before-close{display:none!important}';
  document.head.appendChild(style);
})()
"#;

/// The name field is a controlled input prefilled from the file name; clear
/// it through the native setter so the frontend sees the change.
const CLEAR_NAME_INPUT: &str = r#"
(() => {
  const input = document.querySelector('[data-qa="customize_emoji_add_dialog_input"]');
  if (input) {
    const setter =
      Object.getOwnPropertyDescriptor(window.HTMLInputElement.prototype, 'value').set;
    setter.call(input, '');
    input.dispatchEvent(new Event('input', { bubbles: true }));
  }
})()
"#;

const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

/// Drives the add-emoji form of one workspace gallery through CDP. Exactly
/// one dialog is live at a time; the orchestrator guarantees a close attempt
/// on every exit path.
pub struct ChromeDriver {
    page: Page,
    browser: Browser,
    element_timeout: Duration,
    poll: Duration,
}

impl ChromeDriver {
    /// Launch Chrome and open the gallery page. Sign-in is a separate step.
    pub async fn launch(cfg: &Config) -> Result<Self> {
        let url = cfg.workspace.emoji_page_url()?;
        let chrome = find_chrome(&cfg.browser)?;
        info!(
            "launching {} (headless={})",
            chrome.display(),
            cfg.browser.headless
        );

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome)
            .window_size(cfg.browser.window_width, cfg.browser.window_height)
            .arg("--disable-notifications");
        if !cfg.browser.headless {
            builder = builder.with_head();
        }
        for arg in &cfg.browser.chrome_args {
            builder = builder.arg(arg);
        }
        let browser_config = builder
            .build()
            .map_err(|e| anyhow!("building browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("launching browser")?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page(url.as_str())
            .await
            .with_context(|| format!("opening gallery page: {url}"))?;

        Ok(Self {
            page,
            browser,
            element_timeout: Duration::from_secs(cfg.timeouts.element_seconds),
            poll: Duration::from_millis(cfg.timeouts.poll_ms),
        })
    }

    /// Sign in with email/password and wait for the gallery's add control.
    /// A session that is already signed in (persisted profile) skips the
    /// credential steps.
    pub async fn sign_in(&mut self, creds: &Credentials, login_timeout: Duration) -> Result<()> {
        if self.page.find_element(ADD_BUTTON).await.is_ok() {
            info!("already signed in");
        } else {
            let link = self
                .wait_for(SIGN_IN_PASSWORD_LINK)
                .await
                .context("password sign-in link")?;
            link.click().await?;

            self.wait_for(PASSWORD_INPUT).await?;
            self.wait_for(EMAIL_INPUT)
                .await?
                .click()
                .await?
                .type_str(&creds.email)
                .await?;
            self.wait_for(PASSWORD_INPUT)
                .await?
                .click()
                .await?
                .type_str(&creds.password)
                .await?;
            self.wait_for(SIGN_IN_BUTTON).await?.click().await?;
        }

        self.wait_for_within(ADD_BUTTON, login_timeout)
            .await
            .context("gallery did not appear after sign-in")?;
        self.page
            .evaluate(HIDE_CLOSING_OVERLAY.to_string())
            .await
            .context("injecting overlay stylesheet")?;
        info!("gallery ready");
        Ok(())
    }

    /// Close the browser and wait for the process to exit.
    pub async fn shutdown(mut self) -> Result<()> {
        self.browser.close().await.context("closing browser")?;
        let _ = self.browser.wait().await;
        Ok(())
    }

    async fn wait_for(&self, selector: &str) -> Result<Element> {
        self.wait_for_within(selector, self.element_timeout).await
    }

    async fn wait_for_within(&self, selector: &str, timeout: Duration) -> Result<Element> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.page.find_element(selector).await {
                Ok(el) => return Ok(el),
                Err(err) => {
                    if Instant::now() >= deadline {
                        return Err(anyhow!("timed out waiting for {selector}: {err}"));
                    }
                    tokio::time::sleep(self.poll).await;
                }
            }
        }
    }
}

impl FormDriver for ChromeDriver {
    async fn open_add_dialog(&mut self) -> Result<()> {
        let button = self.wait_for(ADD_BUTTON).await.context("add control")?;
        button.click().await.context("clicking add control")?;
        Ok(())
    }

    async fn submit(&mut self, file: &Path, proposed_name: &str) -> Result<()> {
        // CDP wants an absolute path for file inputs.
        let abs = std::fs::canonicalize(file)
            .with_context(|| format!("resolving {}", file.display()))?;

        let input = self.wait_for(FILE_INPUT).await.context("file input")?;
        let params = SetFileInputFilesParams::builder()
            .files(vec![abs.to_string_lossy().into_owned()])
            .backend_node_id(input.backend_node_id)
            .build()
            .map_err(|e| anyhow!("building file-input params: {e}"))?;
        self.page.execute(params).await.context("selecting file")?;

        let name_input = self.wait_for(NAME_INPUT).await.context("name input")?;
        self.page
            .evaluate(CLEAR_NAME_INPUT.to_string())
            .await
            .context("clearing name input")?;
        name_input
            .click()
            .await?
            .type_str(proposed_name)
            .await
            .context("typing proposed name")?;
        debug!("staged {} as :{proposed_name}:", abs.display());
        Ok(())
    }

    async fn save(&mut self) -> Result<()> {
        let button = self.wait_for(SAVE_BUTTON).await.context("save control")?;
        button.click().await.context("clicking save")?;
        Ok(())
    }

    async fn await_outcome(&mut self, timeout: Duration) -> Result<UploadOutcome> {
        let page = &self.page;
        let poll = self.poll;
        // First signal wins; the losing waits are dropped with the select.
        let outcome = tokio::select! {
            _ = until_absent(page, SAVE_BUTTON, poll) => UploadOutcome::Done,
            _ = until_present(page, DUPLICATE_PREVIEW, poll) => UploadOutcome::DuplicateDetected,
            _ = until_present(page, ERROR_BANNER, poll) => UploadOutcome::ErrorShown,
            _ = tokio::time::sleep(timeout) => UploadOutcome::TimedOut,
        };
        debug!(?outcome, "dialog settled");
        Ok(outcome)
    }

    async fn close_dialog(&mut self) -> Result<()> {
        match self.page.find_element(CLOSE_MODAL).await {
            Ok(button) => {
                button.click().await.context("clicking close")?;
                Ok(())
            }
            // Nothing left to dismiss.
            Err(_) => Ok(()),
        }
    }
}

async fn until_present(page: &Page, selector: &str, poll: Duration) {
    loop {
        if page.find_element(selector).await.is_ok() {
            return;
        }
        tokio::time::sleep(poll).await;
    }
}

async fn until_absent(page: &Page, selector: &str, poll: Duration) {
    loop {
        if page.find_element(selector).await.is_err() {
            return;
        }
        tokio::time::sleep(poll).await;
    }
}

fn find_chrome(opts: &BrowserOptions) -> Result<PathBuf> {
    if !opts.chrome_exe.is_empty() && !opts.chrome_exe.eq_ignore_ascii_case("auto") {
        let p = PathBuf::from(&opts.chrome_exe);
        if p.exists() {
            return Ok(p);
        }
        return Err(anyhow!(
            "configured browser.chrome_exe does not exist: {}",
            p.display()
        ));
    }

    for path in CHROME_PATHS {
        let p = Path::new(path);
        if p.exists() {
            debug!("found Chrome at {path}");
            return Ok(p.to_path_buf());
        }
    }

    for cmd in &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    debug!("found Chrome in PATH: {path}");
                    return Ok(PathBuf::from(path));
                }
            }
        }
    }

    Err(anyhow!(
        "Chrome/Chromium not found; install it or set browser.chrome_exe"
    ))
}

/// Environment report for the `doctor` command. Never launches a browser.
pub fn doctor(cfg: &Config) -> DriverDiag {
    let chrome = find_chrome(&cfg.browser);
    let url = cfg.workspace.emoji_page_url();
    let credentials_present = Credentials::present(&cfg.auth);

    let mut problems = Vec::new();
    if let Err(err) = &chrome {
        problems.push(err.to_string());
    }
    if let Err(err) = &url {
        problems.push(err.to_string());
    }
    if !credentials_present {
        warn!("credentials missing; check [auth] env vars");
        problems.push(format!(
            "credentials missing: {} / {}",
            cfg.auth.email_env, cfg.auth.password_env
        ));
    }

    DriverDiag {
        chrome_exe: chrome.ok().map(|p| p.display().to_string()),
        headless: cfg.browser.headless,
        gallery_url: url.ok(),
        credentials_present,
        ok: problems.is_empty(),
        error: if problems.is_empty() {
            None
        } else {
            Some(problems.join("; "))
        },
    }
}
