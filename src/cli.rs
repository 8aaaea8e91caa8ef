use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value as Json;
use tracing::info;

use crate::container::Container;
use crate::logger;
use crate::options::Options;
use crate::version::VERSION;
use manifest::{BuilderRegistry, Value};

#[derive(Parser, Debug)]
#[command(name = "holt", version = VERSION, about = "Lazy hot-reloading module container")]
pub struct HoltCli {
    #[arg(long, global = true)]
    /// Root directory for module resolution (defaults to the current directory).
    root: Option<PathBuf>,

    #[arg(long, global = true)]
    /// Subdirectory under the root holding module manifests.
    dir: Option<PathBuf>,

    #[arg(long = "alias", global = true, value_name = "KEY=TARGET")]
    /// Alias table entries, matched in the order given.
    aliases: Vec<String>,

    #[arg(long, global = true)]
    /// Disable file watching.
    no_watch: bool,

    #[arg(long, global = true)]
    /// Emit module lifecycle diagnostics.
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

impl HoltCli {
    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a module and print its value.
    Get { name: String },
    /// Print a ready module's metadata.
    Meta { name: String },
    /// Check whether a name resolves to a module.
    Exists { name: String },
    /// Resolve a module and keep re-resolving it as watched sources change.
    Watch {
        name: String,
        /// Poll interval in milliseconds.
        #[arg(long, default_value_t = 500)]
        interval: u64,
    },
}

pub fn run() -> Result<()> {
    let cli = HoltCli::parse();
    logger::init_logging(cli.verbose);

    let mut container = build_container(&cli)?;
    match cli.command() {
        Command::Get { name } => handle_get(&mut container, name),
        Command::Meta { name } => handle_meta(&mut container, name),
        Command::Exists { name } => {
            println!("{}", container.exists(name));
            Ok(())
        }
        Command::Watch { name, interval } => handle_watch(&mut container, name, *interval),
    }
}

fn build_container(cli: &HoltCli) -> Result<Container> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    let mut options = Options::new(root).with_watch(!cli.no_watch);
    if let Some(dir) = &cli.dir {
        options = options.with_dir(dir.clone());
    }
    for alias in &cli.aliases {
        let Some((key, target)) = alias.split_once('=') else {
            bail!("malformed alias `{alias}`, expected KEY=TARGET");
        };
        options = options.with_alias(key, target);
    }
    Ok(Container::new(options, BuilderRegistry::new())?)
}

fn handle_get(container: &mut Container, name: &str) -> Result<()> {
    match container.get(name) {
        Some(value) => {
            println!("{}", render(&value));
            Ok(())
        }
        None => bail!("failed to load module: {name}"),
    }
}

fn handle_meta(container: &mut Container, name: &str) -> Result<()> {
    container.get(name);
    match container.meta(name) {
        Some(meta) => {
            println!("{}", serde_json::to_string_pretty(&*meta)?);
            Ok(())
        }
        None => bail!("no metadata for module: {name}"),
    }
}

fn handle_watch(container: &mut Container, name: &str, interval: u64) -> Result<()> {
    if container.get(name).is_none() {
        bail!("failed to load module: {name}");
    }
    info!("watching module: {name}");
    loop {
        thread::sleep(Duration::from_millis(interval));
        if container.poll() > 0 {
            match container.get(name) {
                Some(value) => info!("reloaded module {name}: {}", render(&value)),
                None => info!("module {name} failed to reload"),
            }
        }
    }
}

fn render(value: &Value) -> String {
    match value.downcast_ref::<Json>() {
        Some(json) => serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string()),
        None => "<opaque value>".to_string(),
    }
}
