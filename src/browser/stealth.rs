//! Per-page anti-detection hardening.
//!
//! Every script here is registered via `AddScriptToEvaluateOnNewDocument`
//! so it runs before any script on the target page. This is best-effort
//! hardening, not a security boundary: a single script failing to inject is
//! logged and skipped; only total failure is an error.

use anyhow::Result;
use chromiumoxide::{Page, cdp};
use tracing::{debug, warn};

/// Fingerprint surface presented to pages
#[derive(Debug, Clone)]
pub struct StealthConfig {
    pub accept_language: String,
    pub platform: String,
    pub languages: Vec<String>,
    pub hardware_concurrency: u32,
    pub webgl_vendor: String,
    pub webgl_renderer: String,
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self {
            accept_language: "en-US,en;q=0.9".to_string(),
            platform: "Win32".to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
            hardware_concurrency: 8,
            webgl_vendor: "Intel Inc.".to_string(),
            webgl_renderer: "Intel(R) UHD Graphics".to_string(),
        }
    }
}

/// Remove the webdriver automation flag
const WEBDRIVER_SCRIPT: &str = r"
    Object.defineProperty(navigator, 'webdriver', {
        get: () => false
    });
";

/// Mock the plugin list headless Chrome leaves empty
const PLUGINS_SCRIPT: &str = r"
    const mockPlugins = [
        {
            name: 'Chrome PDF Plugin',
            description: 'Portable Document Format',
            filename: 'internal-pdf-viewer'
        },
        {
            name: 'Chrome PDF Viewer',
            description: '',
            filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai'
        },
        {
            name: 'Native Client',
            description: '',
            filename: 'internal-nacl-plugin'
        }
    ];
    Object.defineProperty(navigator, 'plugins', {
        get: () => {
            const plugins = {};
            mockPlugins.forEach((plugin, i) => {
                plugins[i] = plugin;
                plugins[plugin.name] = plugin;
            });
            Object.defineProperty(plugins, 'length', { value: mockPlugins.length });
            return plugins;
        }
    });
";

/// Provide the chrome.runtime object extensions expect
const CHROME_RUNTIME_SCRIPT: &str = r"
    if (!window.chrome) {
        window.chrome = {};
    }
    if (!window.chrome.runtime) {
        window.chrome.runtime = {
            connect: () => ({
                onMessage: { addListener: () => {}, removeListener: () => {} },
                postMessage: () => {}
            })
        };
    }
";

/// Override WebGL vendor/renderer fingerprint probes
const WEBGL_SCRIPT_TEMPLATE: &str = r"
    const getParameterProxyHandler = {
        apply: function(target, ctx, args) {
            const param = (args && args[0]) || null;
            // UNMASKED_VENDOR_WEBGL
            if (param === 37445) {
                return '__VENDOR__';
            }
            // UNMASKED_RENDERER_WEBGL
            if (param === 37446) {
                return '__RENDERER__';
            }
            return Reflect.apply(target, ctx, args);
        }
    };
    if (window.WebGLRenderingContext) {
        const getParameter = WebGLRenderingContext.prototype.getParameter;
        WebGLRenderingContext.prototype.getParameter = new Proxy(getParameter, getParameterProxyHandler);
    }
";

/// Apply all stealth measures to a fresh page.
///
/// Must be called before the first navigation: injected scripts only take
/// effect on documents created afterwards.
pub async fn harden_page(page: &Page, config: &StealthConfig) -> Result<()> {
    let languages_json =
        serde_json::to_string(&config.languages).unwrap_or_else(|_| "[]".to_string());

    let languages_script = format!(
        r"
        Object.defineProperty(navigator, 'languages', {{
            get: () => {languages_json}
        }});
        "
    );

    let hardware_script = format!(
        r"
        Object.defineProperty(navigator, 'hardwareConcurrency', {{
            get: () => {}
        }});
        ",
        config.hardware_concurrency
    );

    let webgl_script = WEBGL_SCRIPT_TEMPLATE
        .replace("__VENDOR__", &config.webgl_vendor)
        .replace("__RENDERER__", &config.webgl_renderer);

    let scripts: [(&str, &str); 6] = [
        ("navigator_webdriver", WEBDRIVER_SCRIPT),
        ("navigator_languages", &languages_script),
        ("navigator_plugins", PLUGINS_SCRIPT),
        ("hardware_concurrency", &hardware_script),
        ("chrome_runtime", CHROME_RUNTIME_SCRIPT),
        ("webgl_vendor", &webgl_script),
    ];

    let mut success_count = 0;
    for (name, source) in scripts {
        let result = page
            .execute(
                cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams {
                    source: source.to_string(),
                    include_command_line_api: None,
                    world_name: None,
                    run_immediately: None,
                },
            )
            .await;
        match result {
            Ok(_) => {
                debug!("Injected stealth script: {name}");
                success_count += 1;
            }
            Err(e) => warn!("Failed to inject stealth script {name}: {e}"),
        }
    }

    if success_count == 0 {
        return Err(anyhow::anyhow!("Failed to inject any stealth scripts"));
    }

    // UA override last: strip the Headless marker and pin accept-language
    // and platform so headers match the spoofed navigator properties.
    let ua = page
        .execute(cdp::browser_protocol::browser::GetVersionParams {})
        .await?;
    let modified_ua = ua.user_agent.replace("Headless", "");

    page.execute(cdp::browser_protocol::network::SetUserAgentOverrideParams {
        user_agent: modified_ua,
        accept_language: Some(config.accept_language.clone()),
        platform: Some(config.platform.clone()),
        user_agent_metadata: None,
    })
    .await?;

    debug!(
        "Stealth hardening complete: {success_count}/{} scripts active",
        scripts.len()
    );
    Ok(())
}
