use anyhow::Result;
use clap::{Arg, Command};

mod bundles;
use bundles::{project_root, Project};

fn main() -> Result<()> {
    let matches = Command::new("lang_bundles")
        .about("Manages the language bundles under assets/i18n")
        .arg(
            Arg::new("project")
                .short('p')
                .long("project")
                .value_name("DIR")
                .help("Project root (defaults to the current directory)")
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List language bundles"))
        .subcommand(
            Command::new("create")
                .about("Create a language bundle")
                .arg(Arg::new("language").required(true).help("Bundle name, e.g. en")),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a language bundle")
                .arg(Arg::new("language").required(true))
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Skip the confirmation")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("current-language")
                .about("Show or set the language used for previews")
                .arg(Arg::new("language").help("Language to select; empty string resets")),
        )
        .get_matches();

    let project = Project::new(project_root(matches.get_one::<String>("project")));

    match matches.subcommand() {
        Some(("list", _)) => {
            let current = project.current_language()?;
            for language in project.list()? {
                let marker = if language == current { "*" } else { " " };
                println!("{marker} {language}");
            }
        }
        Some(("create", args)) => {
            let language = args.get_one::<String>("language").map_or("", String::as_str);
            let path = project.create(language)?;
            println!("Created {}", path.display());
        }
        Some(("delete", args)) => {
            let language = args.get_one::<String>("language").map_or("", String::as_str);
            if !args.get_flag("yes") && !confirm(&format!("Delete language bundle {language}?"))? {
                println!("Cancelled");
                return Ok(());
            }
            project.delete(language)?;
            println!("Deleted {language}");
        }
        Some(("current-language", args)) => match args.get_one::<String>("language") {
            Some(language) => {
                project.set_current_language(language)?;
                println!("Current language: {language}");
            }
            None => println!("{}", project.current_language()?),
        },
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    println!("{prompt} [y/N]");
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
