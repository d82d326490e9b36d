use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;

use prompt_templates::cli::{Cli, Command, parse_bindings};
use prompt_templates::config::Config;
use prompt_templates::{Rendered, VariableSet, auto_convert, extract_variables};

fn setup_logging(level: &str) -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init()
        .context("Failed to initialise logger")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    setup_logging(level).context("Failed to setup logging")?;

    info!("pt starting");

    match cli.command {
        Command::Vars { text } => {
            let vars: VariableSet = extract_variables(&text).into_iter().collect();
            if vars.is_empty() {
                println!("No placeholders found");
            } else {
                for name in vars.iter() {
                    println!("{}", name.cyan());
                }
            }
        }
        Command::Render { template, vars } => {
            let template = template.to_template()?;
            let bindings = parse_bindings(&vars)?;
            match template.render(&bindings).context("Failed to render template")? {
                Rendered::Text(text) => println!("{}", text),
                Rendered::Turns(turns) => {
                    for turn in turns {
                        println!("{}", turn);
                    }
                }
            }
        }
        Command::Validate { template, vars } => {
            let template = template.to_template()?;
            let bindings = parse_bindings(&vars)?;
            let missing = template.missing_variables(&bindings);
            if missing.is_empty() {
                println!("{} All required variables supplied", "✓".green());
            } else {
                println!("{} Missing: {}", "✗".red(), missing.join(", ").yellow());
                std::process::exit(1);
            }
        }
        Command::Convert {
            template,
            to,
            prefix,
            suffix,
            separator,
        } => {
            let template = template.to_template()?;
            let mut options = config.conversion_options();
            if let Some(prefix) = prefix {
                options.prefix = Some(prefix);
            }
            if let Some(separator) = separator {
                options.example_separator = separator;
            }
            options.suffix = suffix;

            info!("Converting {} template to {:?}", template.kind(), to);
            let converted = auto_convert(&template, to.into(), &options);
            println!("{}", serde_json::to_string_pretty(&converted)?);
        }
        Command::Schema { template } => {
            let template = template.to_template()?;
            println!("{}", serde_json::to_string_pretty(&template.input_schema())?);
        }
        Command::InitConfig { path, force } => {
            let path = path
                .or_else(Config::default_path)
                .ok_or_else(|| eyre!("No config directory on this platform; pass a path"))?;
            if path.exists() && !force {
                println!("{} {} already exists (use --force to overwrite)", "✗".red(), path.display());
                std::process::exit(1);
            }
            Config::default().save(&path)?;
            println!("{} Wrote {}", "✓".green(), path.display().to_string().cyan());
        }
    }

    Ok(())
}
