//! Command-line interface implementation for sprout.
//! The outer command only knows the template name; everything after it is
//! parsed by the template's own command, built from its descriptor.

use clap::{CommandFactory, Parser, Subcommand};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::args::{command_help, parse_invocation, resolve};
use crate::config::{list_templates, load_config};
use crate::constants::{APP_NAME, DEFAULT_TEMPLATES_DIR, TEMPLATES_ENV};
use crate::error::{Error, Result};
use crate::import::add_shared_templates;
use crate::policy::ConflictPolicy;
use crate::processor::{Action, Generator};
use crate::renderer::MiniJinjaRenderer;
use crate::transforms::TransformRegistry;

/// Command-line arguments structure for sprout.
#[derive(Parser, Debug)]
#[command(
    name = APP_NAME,
    version,
    about = "sprout: create project skeletons from template trees",
    long_about = None,
    disable_help_flag = true,
    disable_help_subcommand = true
)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Show help, or the template's help when a template is given
    #[arg(long)]
    pub help: bool,

    /// Template to generate, followed by its flags and values; lists
    /// templates when omitted
    #[command(subcommand)]
    pub command: Option<TemplateCommand>,
}

/// Everything from the template name on belongs to the template's command.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum TemplateCommand {
    #[command(external_subcommand)]
    Template(Vec<String>),
}

impl Args {
    /// Name of the requested template.
    pub fn template(&self) -> Option<&str> {
        match &self.command {
            Some(TemplateCommand::Template(argv)) => argv.first().map(String::as_str),
            None => None,
        }
    }

    /// Arguments following the template name.
    pub fn rest(&self) -> &[String] {
        match &self.command {
            Some(TemplateCommand::Template(argv)) => argv.get(1..).unwrap_or_default(),
            None => &[],
        }
    }
}

/// Rewrites Go-style single-dash long flags (`-help`, `-name=x`) to their
/// double-dash form. Arguments after `--` are left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg: OsString| {
            if passthrough {
                return arg;
            }
            let Some(s) = arg.to_str() else {
                return arg;
            };
            if s == "--" {
                passthrough = true;
                return arg;
            }
            match s.strip_prefix('-') {
                Some(flag)
                    if !flag.starts_with('-')
                        && flag.starts_with(|c: char| c.is_ascii_alphabetic())
                        && flag.split('=').next().is_some_and(|name| name.len() > 1) =>
                {
                    OsString::from(format!("-{s}"))
                }
                _ => arg,
            }
        })
        .collect()
}

/// Parses the process arguments.
pub fn get_args() -> Args {
    Args::parse_from(normalize_args(std::env::args_os()))
}

/// Template root: `$SPROUT_TEMPLATES`, else `<config dir>/sprout/templates`.
pub fn templates_root() -> PathBuf {
    match std::env::var_os(TEMPLATES_ENV) {
        Some(root) if !root.is_empty() => PathBuf::from(root),
        _ => dirs::config_dir()
            .map(|dir| dir.join(APP_NAME).join(DEFAULT_TEMPLATES_DIR))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATES_DIR)),
    }
}

/// Lists the templates of `root` along with the outer usage.
pub fn templates_help<P: AsRef<Path>>(root: P) -> String {
    let root = root.as_ref();
    let mut out = format!("Usage of {APP_NAME}:\n\n  {APP_NAME} 'templateName'\n\n");
    out.push_str(&Args::command().render_help().to_string());

    match list_templates(root) {
        Ok(templates) => {
            out.push_str(&format!("\nTemplates Path: {}\n\nList of Templates:\n", root.display()));
            for template in templates {
                out.push_str(&format!(
                    "{name}: {APP_NAME} {name} -help\n    {doc}\n",
                    name = template.name,
                    doc = template.doc
                ));
            }
        }
        Err(_) => {
            out.push_str(&format!("\ncan't read template directory {}\n", root.display()));
        }
    }
    out
}

/// Main application logic execution.
///
/// # Flow
/// 1. Without template: prints the template listing
/// 2. Loads the template descriptor and parses the template arguments
/// 3. Prints the command help when asked to
/// 4. Resolves the variables; a missing required one prints the command help
/// 5. Registers the shared root-level templates
/// 6. Generates the tree, narrating one line per file
pub fn run(args: Args, root: &Path) -> Result<()> {
    let Some(template) = args.template() else {
        print!("{}", templates_help(root));
        return Ok(());
    };

    let template_dir = root.join(template);
    let config = load_config(&template_dir);
    let invocation = parse_invocation(template, &config, args.rest())?;

    if args.help || invocation.help {
        print!("{}", command_help(template, &template_dir, &config));
        return Ok(());
    }

    let context = match resolve(&config, &invocation) {
        Ok(context) => context.with_builtins(chrono::Local::now()),
        Err(err @ Error::MissingRequiredArgument { .. }) => {
            print!("{}", command_help(template, &template_dir, &config));
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    let mut renderer = MiniJinjaRenderer::new(&config.delimiters, &TransformRegistry::standard());
    add_shared_templates(&template_dir, &mut renderer);
    let generator = Generator::new(
        &renderer,
        &context,
        &template_dir,
        ConflictPolicy::from_force(invocation.force),
    );

    match generator.generate(&invocation.output, |outcome| println!("{outcome}")) {
        Ok(report) => {
            let untouched = report.count(Action::LeftUntouched);
            log::debug!(
                "{} files written, {} left untouched",
                report.outcomes.len() - untouched,
                untouched
            );
            Ok(())
        }
        Err(err @ Error::TemplateRootUnreadable { .. }) => {
            print!("{}", templates_help(root));
            Err(err)
        }
        Err(err) => Err(err),
    }
}
