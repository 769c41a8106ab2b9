use escaped_this::analysis::Finding;
use escaped_this::check::{EscapedThisChecker, Settings};
use escaped_this::jvm::class_file::ClassFile;

use clap::{crate_version, value_parser, Arg, ArgAction, Command};
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::exit;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use walkdir::WalkDir;

fn main() -> io::Result<()> {
    env_logger::init();

    let matches = Command::new("Escaped `this` checker")
        .version(crate_version!())
        .about("Find JVM constructors that let `this` escape before construction completes")
        .arg(
            Arg::new("no-invokedynamic")
                .long("no-invokedynamic")
                .action(ArgAction::SetTrue)
                .help("Don't treat `invokedynamic` (eg. lambdas capturing `this`) as a call"),
        )
        .arg(
            Arg::new("skip-synthetic")
                .long("skip-synthetic")
                .action(ArgAction::SetTrue)
                .help("Skip classes generated by the compiler"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Only print the summary"),
        )
        .arg(
            Arg::new("INPUT")
                .help("Class files, or folders to search for class files")
                .required(true)
                .num_args(1..)
                .value_parser(value_parser!(PathBuf)),
        )
        .get_matches();

    let settings = Settings {
        include_invokedynamic: !matches.get_flag("no-invokedynamic"),
        skip_synthetic_classes: matches.get_flag("skip-synthetic"),
    };
    let quiet = matches.get_flag("quiet");
    let checker = EscapedThisChecker::new(settings);

    // Find all of the class files
    let mut class_files: Vec<PathBuf> = vec![];
    for input_path in matches.get_many::<PathBuf>("INPUT").into_iter().flatten() {
        if input_path.is_dir() {
            class_files.extend(
                WalkDir::new(input_path)
                    .follow_links(true)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .map(|e| e.into_path())
                    .filter(|e| e.is_file() && e.extension().map_or(false, |ex| ex == "class")),
            );
        } else {
            class_files.push(input_path.clone());
        }
    }

    let stdout = StandardStream::stdout(ColorChoice::Auto);
    let mut count_classes = 0;
    let mut count_findings = 0;
    let mut count_error = 0;

    for class_file in class_files {
        log::info!("Checking '{}'", class_file.display());

        let mut findings: Vec<Finding> = vec![];
        let outcome = ClassFile::read_from_path(&class_file)
            .map_err(escaped_this::check::Error::from)
            .and_then(|class| checker.check_class(&class, &mut findings));

        let mut s = stdout.lock();
        match outcome {
            Ok(_) => {
                count_classes += 1;
                count_findings += findings.len();
                if !quiet {
                    for finding in &findings {
                        print_finding(&mut s, &class_file, finding)?;
                    }
                }
            }
            Err(err) => {
                count_error += 1;
                log::error!("Failed to check '{}': {:?}", class_file.display(), err);
                s.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
                s.write_all(b"ERROR ")?;
                s.reset()?;
                writeln!(s, "{}: {:?}", class_file.display(), err)?;
            }
        }
    }

    // Summary
    let mut s = stdout.lock();
    let color = if count_error > 0 {
        Color::Yellow
    } else if count_findings > 0 {
        Color::Red
    } else {
        Color::Green
    };
    s.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(
        s,
        "{} finding(s) in {} class(es)",
        count_findings, count_classes
    )?;
    if count_error > 0 {
        write!(s, ", {} unreadable", count_error)?;
    }
    s.reset()?;
    s.write_all(b"\n")?;

    // Exit code
    exit(if count_error > 0 {
        2
    } else if count_findings > 0 {
        1
    } else {
        0
    })
}

/// One line per finding: `<class>: <message> (<site>)`
fn print_finding(s: &mut impl WriteColor, path: &Path, finding: &Finding) -> io::Result<()> {
    s.set_color(ColorSpec::new().set_bold(true))?;
    write!(s, "{}", finding.class)?;
    s.reset()?;
    write!(s, ": ")?;
    s.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
    write!(s, "{}", finding.message)?;
    s.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(s, " ({}) [{}]", finding.site, path.display())?;
    s.reset()
}
