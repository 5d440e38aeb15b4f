//! Prompt Templates CLI
//!
//! Usage:
//!   prompt-templates [OPTIONS] [NAME]
//!
//! Options:
//!   -m, --manifest <FILE>        TOML manifest of templates
//!   -t, --template <NAME=FILE>   Register one template from a file (repeatable)
//!   -a, --args <FILE>            TOML file of arguments
//!   -s, --set <KEY=VALUE>        String argument (repeatable, overrides --args)
//!   -p, --prompt <TEXT>          Prompt text passed to the renderer
//!   -l, --list                   List registered template names
//!   -f, --fields                 Show the placeholders of NAME instead of rendering
//!   -h, --help                   Print help

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use prompt_templates::{
    parse_assignment, Arguments, Manifest, RegistryError, TemplateRegistry, PROMPT_KEY,
};

#[derive(Parser)]
#[command(name = "prompt-templates")]
#[command(about = "Register named text templates and render them with arguments")]
struct Cli {
    /// Template to render
    name: Option<String>,

    /// TOML manifest declaring templates
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Register a template from a file, as NAME=FILE
    #[arg(short, long = "template", value_name = "NAME=FILE", value_parser = parse_assignment)]
    templates: Vec<(String, String)>,

    /// TOML file of arguments
    #[arg(short, long)]
    args: Option<PathBuf>,

    /// Set a string argument, as KEY=VALUE
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,

    /// Prompt text passed through to the renderer
    #[arg(short, long, default_value = "")]
    prompt: String,

    /// List registered template names
    #[arg(short, long)]
    list: bool,

    /// Show the placeholders the template substitutes
    #[arg(short, long)]
    fields: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = TemplateRegistry::new();

    // Load manifest
    if let Some(path) = &cli.manifest {
        let manifest = match Manifest::from_file(path) {
            Ok(m) => m,
            Err(e) => fail(&format!("Error loading manifest '{}': {}", path.display(), e)),
        };
        if let Err(e) = registry.load_manifest(&manifest) {
            report_registry_error(&e, path);
        }
    }

    for (name, file) in &cli.templates {
        if let Err(e) = registry.register_from_file(name, file) {
            report_registry_error(&e, Path::new(file));
        }
    }

    if cli.list {
        let mut names = registry.names();
        names.sort();
        for name in names {
            println!("{}", name);
        }
        return;
    }

    let Some(name) = cli.name.as_deref() else {
        fail("Error: no template name given (use --list to see registered templates)");
    };

    if cli.fields {
        match registry.placeholders(name) {
            Some(fields) => {
                for field in fields {
                    println!("{}", field);
                }
            }
            None => fail(&format!("Error: template '{}' is not registered", name)),
        }
        return;
    }

    // File first, then --set overrides
    let args = match Arguments::load(cli.args.as_deref(), &cli.set) {
        Ok(a) => a,
        Err(e) => fail(&format!("Error loading arguments: {}", e)),
    };

    let Some(renderer) = registry.lookup(name) else {
        fail(&format!("Error: template '{}' is not registered", name));
    };

    match renderer.render(&cli.prompt, &args) {
        Ok(mut out) => {
            println!("{}", out.remove(PROMPT_KEY).unwrap_or_default());
        }
        Err(e) => fail(&format!("Error: {}", e)),
    }
}

/// Print a registry error, with source context for parse errors, and exit
fn report_registry_error(err: &RegistryError, origin: &Path) -> ! {
    if let RegistryError::Parse { name, errors } = err {
        let source = template_source(name, origin);
        for e in errors {
            match &source {
                Some(text) => eprint!("{}", e.format(text, name)),
                None => eprintln!("Error in template '{}': {}", name, e),
            }
        }
        process::exit(1);
    }
    fail(&format!("Error: {}", err))
}

/// Re-read the source of a template that failed to parse, for diagnostics
fn template_source(name: &str, origin: &Path) -> Option<String> {
    let is_manifest = origin.extension().is_some_and(|ext| ext == "toml");
    if !is_manifest {
        return fs::read_to_string(origin).ok();
    }

    let manifest = Manifest::from_file(origin).ok()?;
    if let Some(content) = manifest.templates.get(name) {
        return Some(content.clone());
    }
    let path = manifest.files.get(name)?;
    fs::read_to_string(manifest.resolve_path(path)).ok()
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}
