use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

use embedfix_cli::config::{
	LOCAL_SETTINGS_FILE, LoadedSettings, Platform, default_store_dir, discover_settings,
	generate_init_template, user_settings_path,
};
use embedfix_cli::hooks::{HookKind, Interceptor, LocalHost, Message, MessagePipeline};
use embedfix_cli::rules::{RuleKind, UserRule};
use embedfix_cli::store::{FileStore, RuleStore};

#[derive(Parser)]
#[command(name = "embedfix")]
#[command(
	author,
	version,
	about = "Rewrites social-media links to embed-friendly mirrors and applies your find/replace rules"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Create a template .embedfix.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .embedfix.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,

	/// Settings file to use instead of the discovered one
	#[arg(long, global = true, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Directory holding the rule lists
	#[arg(long, global = true, value_name = "DIR")]
	store: Option<PathBuf>,

	/// Increase log output (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = ArgAction::Count)]
	verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Transform a message the way it would be on send
	Send {
		#[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
		text: Vec<String>,
	},
	/// Transform a message the way it would be on edit
	Edit {
		#[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
		text: Vec<String>,
	},
	/// Show what your find/replace rules do to a message
	Preview {
		#[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
		text: Vec<String>,
	},
	/// Find/replace rule management commands
	Rules {
		#[command(subcommand)]
		action: RulesAction,
	},
	/// Settings management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum RulesAction {
	/// List both rule lists
	List,
	/// Change a rule; the index of the empty last rule adds a new one
	Set {
		kind: KindArg,
		index: usize,
		#[arg(long)]
		find: Option<String>,
		#[arg(long)]
		replace: Option<String>,
		#[arg(long)]
		only_if_includes: Option<String>,
	},
	/// Delete a rule
	Remove { kind: KindArg, index: usize },
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display the effective settings and where they came from
	Show,
	/// Check the settings file and stored pattern rules for errors
	Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
	String,
	Pattern,
}

impl From<KindArg> for RuleKind {
	fn from(value: KindArg) -> Self {
		match value {
			KindArg::String => RuleKind::String,
			KindArg::Pattern => RuleKind::Pattern,
		}
	}
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	if cli.init {
		return handle_init(cli.force);
	}

	let Some(command) = cli.command else {
		// arg_required_else_help covers the no-argument case
		return Ok(ExitCode::SUCCESS);
	};

	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let explicit = cli.config.as_deref();

	match command {
		Commands::Config { action } => match action {
			ConfigAction::Show => handle_config_show(&cwd, explicit, cli.store),
			ConfigAction::Validate => handle_config_validate(&cwd, explicit, cli.store),
		},
		Commands::Send { text } => {
			let (loaded, store) = open_session(&cwd, explicit, cli.store)?;
			handle_message(HookKind::Send, &text, loaded, store)
		}
		Commands::Edit { text } => {
			let (loaded, store) = open_session(&cwd, explicit, cli.store)?;
			handle_message(HookKind::Edit, &text, loaded, store)
		}
		Commands::Preview { text } => {
			let (_, store) = open_session(&cwd, explicit, cli.store)?;
			handle_preview(&text, store)
		}
		Commands::Rules { action } => {
			let (_, store) = open_session(&cwd, explicit, cli.store)?;
			match action {
				RulesAction::List => handle_rules_list(&store),
				RulesAction::Set {
					kind,
					index,
					find,
					replace,
					only_if_includes,
				} => handle_rules_set(store, kind.into(), index, find, replace, only_if_includes),
				RulesAction::Remove { kind, index } => {
					handle_rules_remove(store, kind.into(), index)
				}
			}
		}
	}
}

/// Load settings and the rule store they point at.
fn open_session(
	cwd: &Path,
	explicit: Option<&Path>,
	cli_store: Option<PathBuf>,
) -> Result<(LoadedSettings, RuleStore)> {
	let loaded = discover_settings(cwd, explicit).context("Failed to load settings")?;
	let store_dir = resolve_store_dir(cli_store, &loaded)?;
	let store = RuleStore::load(Box::new(FileStore::new(&store_dir)));
	Ok((loaded, store))
}

fn init_logging(verbose: u8) {
	let default_level = match verbose {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_env("EMBEDFIX_LOG")
		.unwrap_or_else(|_| EnvFilter::new(default_level));

	// Only fails if a subscriber is already installed
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.try_init();
}

fn resolve_store_dir(cli_store: Option<PathBuf>, loaded: &LoadedSettings) -> Result<PathBuf> {
	if let Some(dir) = cli_store.or_else(|| loaded.settings.store_dir.clone()) {
		return Ok(dir);
	}
	default_store_dir().context("Failed to resolve the default rule store directory")
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let settings_path = PathBuf::from(LOCAL_SETTINGS_FILE);

	if settings_path.exists() && !force {
		anyhow::bail!("{LOCAL_SETTINGS_FILE} already exists. Use --force to overwrite.");
	}

	std::fs::write(&settings_path, generate_init_template())
		.with_context(|| format!("Failed to write {}", settings_path.display()))?;

	println!("Created {LOCAL_SETTINGS_FILE}");
	Ok(ExitCode::SUCCESS)
}

fn handle_message(
	kind: HookKind,
	text: &[String],
	loaded: LoadedSettings,
	store: RuleStore,
) -> Result<ExitCode> {
	let pipeline = MessagePipeline::new(loaded.settings, Rc::new(RefCell::new(store)))
		.context("Failed to build message pipeline")?;
	let mut interceptor = Interceptor::new(pipeline);
	let mut host = LocalHost::new();
	interceptor.start(&mut host);

	let mut message = Message::new(text.join(" "));
	host.dispatch(kind, &mut message);

	interceptor.stop(&mut host);
	println!("{}", message.content);
	Ok(ExitCode::SUCCESS)
}

fn handle_preview(text: &[String], store: RuleStore) -> Result<ExitCode> {
	let transformed = embedfix_cli::rules::apply_rules(&text.join(" "), store.rule_set());
	println!("{}", transformed.content);

	// The partial result is still printed so the user can see how far it got
	if let Some(error) = transformed.error {
		eprintln!("error: {error}");
		if let Some(source) = std::error::Error::source(&error) {
			eprintln!("  caused by: {source}");
		}
		return Ok(ExitCode::FAILURE);
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_rules_list(store: &RuleStore) -> Result<ExitCode> {
	for kind in [RuleKind::String, RuleKind::Pattern] {
		let errors = store.errors(kind);
		println!("{} rules:", capitalize(kind.as_str()));

		for (i, rule) in store.rules(kind).iter().enumerate() {
			if rule.is_empty() {
				println!("  {i}: (empty)");
				continue;
			}
			print!("  {i}: find={:?} replace={:?}", rule.find, rule.replace);
			if let Some(guard) = rule.guard() {
				print!(" only-if-includes={guard:?}");
			}
			println!();
			if let Some((_, error)) = errors.iter().find(|(index, _)| *index == i) {
				println!("     invalid: {error}");
			}
		}
		println!();
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_rules_set(
	mut store: RuleStore,
	kind: RuleKind,
	index: usize,
	find: Option<String>,
	replace: Option<String>,
	only_if_includes: Option<String>,
) -> Result<ExitCode> {
	if find.is_none() && replace.is_none() && only_if_includes.is_none() {
		anyhow::bail!("Nothing to set. Pass --find, --replace or --only-if-includes.");
	}

	let mut rule: UserRule = store.rules(kind).get(index).cloned().unwrap_or_default();
	if let Some(find) = find {
		rule.find = find;
	}
	if let Some(replace) = replace {
		rule.replace = replace;
	}
	if let Some(guard) = only_if_includes {
		rule.only_if_includes = guard;
	}

	// An emptied rule is pruned on save, so `index` then names the next rule.
	let emptied = rule.is_empty();
	store
		.set_rule(kind, index, rule)
		.with_context(|| format!("Failed to set {} rule {index}", kind.as_str()))?;

	if emptied {
		println!("Removed empty {} rule {index}", kind.as_str());
		return Ok(ExitCode::SUCCESS);
	}

	if let Some((_, error)) = store.errors(kind).iter().find(|(i, _)| *i == index) {
		eprintln!("warning: rule {index} does not compile: {error}");
	}
	println!("Saved {} rule {index}", kind.as_str());
	Ok(ExitCode::SUCCESS)
}

fn handle_rules_remove(mut store: RuleStore, kind: RuleKind, index: usize) -> Result<ExitCode> {
	let removed = store
		.remove(kind, index)
		.with_context(|| format!("Failed to remove {} rule {index}", kind.as_str()))?;
	println!("Removed {} rule {index} (find={:?})", kind.as_str(), removed.find);
	Ok(ExitCode::SUCCESS)
}

fn handle_config_show(
	cwd: &Path,
	explicit: Option<&Path>,
	cli_store: Option<PathBuf>,
) -> Result<ExitCode> {
	let loaded = discover_settings(cwd, explicit).context("Failed to load settings")?;

	match loaded.path {
		Some(ref path) => println!("# Source: {}", path.display()),
		None => println!("# Source: built-in defaults"),
	}
	println!("apply-rules-on-send: {}", loaded.settings.apply_rules_on_send);
	match resolve_store_dir(cli_store, &loaded) {
		Ok(dir) => println!("store-dir: {}", dir.display()),
		Err(_) => println!("store-dir: (unresolved)"),
	}
	println!();
	println!("platforms:");
	for platform in Platform::ALL {
		let state = if loaded.settings.platforms.is_enabled(platform) {
			"enabled"
		} else {
			"disabled"
		};
		println!("  {}: {state}", platform.as_str());
	}

	println!();
	if let Ok(user_path) = user_settings_path() {
		println!("User settings path: {}", user_path.display());
		if user_path.exists() {
			println!("  (exists)");
		} else {
			println!("  (not found)");
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate(
	cwd: &Path,
	explicit: Option<&Path>,
	cli_store: Option<PathBuf>,
) -> Result<ExitCode> {
	let loaded = match discover_settings(cwd, explicit) {
		Ok(loaded) => loaded,
		Err(e) => {
			eprintln!("Settings error: {e}");
			if let Some(source) = std::error::Error::source(&e) {
				eprintln!("  caused by: {source}");
			}
			return Ok(ExitCode::FAILURE);
		}
	};

	match loaded.path {
		Some(ref path) => println!("Settings are valid: {}", path.display()),
		None => println!("No settings file found, using defaults."),
	}

	let store_dir = resolve_store_dir(cli_store, &loaded)?;
	let store = RuleStore::load(Box::new(FileStore::new(&store_dir)));
	let errors = store.errors(RuleKind::Pattern);
	if errors.is_empty() {
		println!("All pattern rules compile.");
		return Ok(ExitCode::SUCCESS);
	}

	for (index, error) in errors {
		eprintln!("Pattern rule {index} is invalid: {error}");
	}
	Ok(ExitCode::FAILURE)
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
