use std::io::{self, BufRead, Write};
use std::sync::Arc;

use log::error;

use crate::chart::ChartRequest;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::ChartError;
use crate::server;

const CHART_PROMPT: &str = "Type Chart \"pie\", \"bar\" or \"exit\" to quit => ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Interactive,
    Bar,
    Pie,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("interactive") => Some(Command::Interactive),
        Some("bar") => Some(Command::Bar),
        Some("pie") => Some(Command::Pie),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("usage: worldpop <serve|interactive|bar <country>|pie <continent> [top_n]>");
        return 2;
    };

    let config = AppConfig::from_env();
    let ctx = match AppContext::load(config) {
        Ok(ctx) => ctx,
        Err(err) => {
            error!("data source error: {err}");
            eprintln!("data source error: {err}");
            return 1;
        }
    };

    match command {
        Command::Serve => handle_serve(ctx),
        Command::Interactive => handle_interactive(&ctx),
        Command::Bar => handle_bar(&ctx, args),
        Command::Pie => handle_pie(&ctx, args),
    }
}

fn handle_serve(ctx: Arc<AppContext>) -> i32 {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            return 1;
        }
    };
    match runtime.block_on(server::run_server(ctx)) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_interactive(ctx: &AppContext) -> i32 {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    match run_interactive(ctx, &mut input, &mut output) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("interactive session failed: {err}");
            1
        }
    }
}

fn handle_bar(ctx: &AppContext, args: &[String]) -> i32 {
    let Some(country) = joined_name(args.get(2..)) else {
        eprintln!("usage: worldpop bar <country>");
        return 2;
    };
    report_render(ctx.render_chart(&ChartRequest::bar(&country)))
}

fn handle_pie(ctx: &AppContext, args: &[String]) -> i32 {
    let (name_parts, top_arg) = split_top_n(args.get(2..).unwrap_or_default());
    let Some(continent) = joined_name(Some(name_parts)) else {
        eprintln!("usage: worldpop pie <continent> [top_n]");
        return 2;
    };
    let top_n = parse_top_n_arg(top_arg, ctx.config.pie_top_n);
    report_render(ctx.render_chart(&ChartRequest::pie(&continent, top_n)))
}

/// A trailing all-digit arg after at least one name word is `top_n`
/// (`pie north america 3`).
fn split_top_n(rest: &[String]) -> (&[String], Option<&String>) {
    match rest.split_last() {
        Some((last, name)) if !name.is_empty() && last.bytes().all(|b| b.is_ascii_digit()) => {
            (name, Some(last))
        }
        _ => (rest, None),
    }
}

fn report_render(result: Result<std::path::PathBuf, ChartError>) -> i32 {
    match result {
        Ok(path) => {
            println!("{}", path.display());
            0
        }
        Err(err @ (ChartError::NotFound { .. } | ChartError::EmptySeries(_))) => {
            eprintln!("{err}");
            1
        }
        Err(err) => {
            eprintln!("chart rendering failed: {err}");
            1
        }
    }
}

/// Country names may arrive split across several args (`bar south africa`).
fn joined_name(parts: Option<&[String]>) -> Option<String> {
    let name = parts?.join(" ");
    if name.trim().is_empty() {
        None
    } else {
        Some(name)
    }
}

fn parse_top_n_arg(raw: Option<&String>, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok().filter(|n| *n > 0))
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid top_n '{value}', defaulting to {default}");
            }
            default
        })
}

/// Prompt loop: `pie` and `bar` ask for a name and write a chart, `exit` or end of
/// input returns.
pub fn run_interactive<R: BufRead, W: Write>(
    ctx: &AppContext,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    loop {
        let Some(choice) = prompt(input, output, CHART_PROMPT)? else {
            return Ok(());
        };
        let request = match choice.as_str() {
            "exit" => return Ok(()),
            "pie" => {
                writeln!(output, "pie => (%) Continent/WorldPopulation")?;
                let Some(continent) = prompt(input, output, "Type Continent => ")? else {
                    return Ok(());
                };
                ChartRequest::pie(&continent, ctx.config.pie_top_n)
            }
            "bar" => {
                writeln!(output, "bar => Country/Population for year")?;
                let Some(country) = prompt(input, output, "Type Country => ")? else {
                    return Ok(());
                };
                ChartRequest::bar(&country)
            }
            _ => {
                writeln!(output, "Invalid chart type. Please choose 'pie' or 'bar'.")?;
                continue;
            }
        };

        match ctx.render_chart(&request) {
            Ok(path) => writeln!(
                output,
                "Generated {} chart in path: \"{}\"",
                request.kind(),
                path.display()
            )?,
            Err(err @ (ChartError::NotFound { .. } | ChartError::EmptySeries(_))) => {
                writeln!(output, "{err}")?
            }
            Err(err) => {
                error!("chart rendering failed: {err}");
                writeln!(output, "chart rendering failed: {err}")?
            }
        }
    }
}

/// `None` on end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> io::Result<Option<String>> {
    write!(output, "{message}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(output)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::load_table_from_reader;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn context(name: &str) -> Arc<AppContext> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let csv = "\
Country,Continent,2020 Population,2010 Population,World Population Percentage
Colombia,South America,50882884,44816108,0.64
Peru,South America,33304756,29229572,0.43
";
        let table = load_table_from_reader(csv.as_bytes()).expect("fixture should load");
        let config = AppConfig {
            image_dir: std::env::temp_dir().join(format!("worldpop-cli-{name}-{stamp}")),
            ..AppConfig::default()
        };
        AppContext::with_table(config, table)
    }

    fn session(ctx: &AppContext, script: &str) -> String {
        let mut input = script.as_bytes();
        let mut output = Vec::new();
        run_interactive(ctx, &mut input, &mut output).expect("session should finish");
        String::from_utf8(output).expect("output should be utf-8")
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command(&args(&["worldpop", "serve"])), Some(Command::Serve));
        assert_eq!(parse_command(&args(&["worldpop", "interactive"])), Some(Command::Interactive));
        assert_eq!(parse_command(&args(&["worldpop", "bar", "x"])), Some(Command::Bar));
        assert_eq!(parse_command(&args(&["worldpop", "pie"])), Some(Command::Pie));
        assert_eq!(parse_command(&args(&["worldpop", "plot"])), None);
        assert_eq!(parse_command(&args(&["worldpop"])), None);
    }

    #[test]
    fn unknown_choice_reprompts_then_exits() {
        let ctx = context("reprompt");
        let out = session(&ctx, "line\nexit\n");
        assert!(out.contains("Invalid chart type. Please choose 'pie' or 'bar'."));
        assert_eq!(out.matches(CHART_PROMPT).count(), 2);
    }

    #[test]
    fn bar_choice_writes_chart() {
        let ctx = context("bar");
        let out = session(&ctx, "bar\ncolombia\nexit\n");
        let expected: PathBuf = ctx.config.image_dir.join("bar_Colombia.png");
        assert!(out.contains("Generated bar chart"), "{out}");
        assert!(expected.is_file());
        let _ = std::fs::remove_dir_all(&ctx.config.image_dir);
    }

    #[test]
    fn pie_choice_writes_chart() {
        let ctx = context("pie");
        let out = session(&ctx, "pie\nsouth america\nexit\n");
        assert!(out.contains("Generated pie chart"), "{out}");
        assert!(ctx.config.image_dir.join("pie_South_America.png").is_file());
        let _ = std::fs::remove_dir_all(&ctx.config.image_dir);
    }

    #[test]
    fn unknown_country_is_reported_and_loop_continues() {
        let ctx = context("unknown");
        let out = session(&ctx, "bar\natlantis\nexit\n");
        assert!(out.contains("no data found for bar chart entity Atlantis"), "{out}");
        assert_eq!(out.matches(CHART_PROMPT).count(), 2);
    }

    #[test]
    fn end_of_input_ends_session() {
        let ctx = context("eof");
        let out = session(&ctx, "bar\n");
        assert!(out.contains("Type Country => "));
    }

    #[test]
    fn pie_args_join_words_and_split_trailing_top_n() {
        let rest = args(&["north", "america", "3"]);
        let (name, top) = split_top_n(&rest);
        assert_eq!(joined_name(Some(name)).as_deref(), Some("north america"));
        assert_eq!(top.map(String::as_str), Some("3"));

        let rest = args(&["north", "america"]);
        let (name, top) = split_top_n(&rest);
        assert_eq!(joined_name(Some(name)).as_deref(), Some("north america"));
        assert_eq!(top, None);

        let rest = args(&["2020"]);
        let (name, top) = split_top_n(&rest);
        assert_eq!(name.len(), 1);
        assert_eq!(top, None);

        let (name, top) = split_top_n(&[]);
        assert!(joined_name(Some(name)).is_none());
        assert_eq!(top, None);
    }

    #[test]
    fn top_n_argument_falls_back_to_default() {
        assert_eq!(parse_top_n_arg(Some(&"3".to_string()), 5), 3);
        assert_eq!(parse_top_n_arg(Some(&"zero".to_string()), 5), 5);
        assert_eq!(parse_top_n_arg(Some(&"0".to_string()), 5), 5);
        assert_eq!(parse_top_n_arg(None, 5), 5);
    }
}
