//! `lx offline`: show the offline cache plan for the configured app version.

use anyhow::Result;
use clap::Args;
use lexis_core::offline::{CacheConfig, CacheStorage, OfflineShell, Request, Strategy};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::output::{OutputMode, pretty_kv, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct OfflineArgs {
    /// Request URLs or paths to classify.
    pub urls: Vec<String>,

    /// HTTP method of the classified requests.
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// Treat the requests as page navigations.
    #[arg(long)]
    pub navigate: bool,
}

#[derive(Debug, Serialize)]
struct Route {
    url: String,
    strategy: Strategy,
    api: bool,
}

#[derive(Debug, Serialize)]
struct OfflinePlan {
    static_cache: String,
    dynamic_cache: String,
    static_assets: Vec<String>,
    offline_document: String,
    routes: Vec<Route>,
}

/// Execute `lx offline`.
///
/// # Errors
///
/// Returns an error if the project cannot be opened.
pub fn run_offline(args: &OfflineArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let offline = &project.config.offline;
    let shell = OfflineShell::new(
        CacheConfig::new(offline.app.clone(), offline.version.to_string()),
        CacheStorage::default(),
    );

    let routes = args
        .urls
        .iter()
        .map(|url| {
            let mut request = if args.navigate {
                Request::navigate(url.clone())
            } else {
                Request::get(url.clone())
            };
            request.method.clone_from(&args.method);
            Route {
                url: url.clone(),
                strategy: shell.strategy_for(&request),
                api: shell.is_api_request(&request),
            }
        })
        .collect();

    let config = shell.config();
    let plan = OfflinePlan {
        static_cache: config.static_cache_name(),
        dynamic_cache: config.dynamic_cache_name(),
        static_assets: config.static_assets.clone(),
        offline_document: config.offline_document.clone(),
        routes,
    };

    render_mode(
        output,
        &plan,
        |p, w| {
            for r in &p.routes {
                writeln!(w, "{}\t{}", r.url, strategy_name(r.strategy))?;
            }
            Ok(())
        },
        |p, w| {
            pretty_kv(w, "Static", &p.static_cache)?;
            pretty_kv(w, "Dynamic", &p.dynamic_cache)?;
            pretty_kv(w, "Assets", p.static_assets.join(", "))?;
            pretty_kv(w, "Offline", &p.offline_document)?;
            for r in &p.routes {
                let api = if r.api { " (api)" } else { "" };
                writeln!(w, "  {} → {}{api}", r.url, strategy_name(r.strategy))?;
            }
            Ok(())
        },
    )
}

const fn strategy_name(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::Bypass => "bypass",
        Strategy::CacheFirst => "cache_first",
        Strategy::NetworkFirst => "network_first",
    }
}
