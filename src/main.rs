use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use rutherford::build::build_site;
use rutherford::config::Config;
use rutherford::extension::Rutherford;
use std::path::Path;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let matches = App::new("rutherford")
        .version(crate_version!())
        .about("Builds a blog and writes an Atom feed of its latest posts")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .global(true)
                .help("Logs more detail; repeat for more"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Parses the posts and writes the feed")
                .arg(
                    Arg::with_name("project")
                        .long("project")
                        .short("p")
                        .takes_value(true)
                        .default_value(".")
                        .help("A directory inside the project"),
                )
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .help("The output directory [default: {project root}/_build]"),
                ),
        )
        .get_matches();

    let level = match matches.occurrences_of("verbose") {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("rutherford={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let ("build", Some(matches)) = matches.subcommand() {
        if let Err(e) = build(matches) {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn build(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let project = Path::new(matches.value_of("project").unwrap_or("."));
    let config = Config::from_directory(project, matches.value_of("output").map(Path::new))?;
    let extension = Rutherford::new(config.feed.clone(), config.feed_template.clone());
    build_site(&config, &extension)?;
    Ok(())
}
