use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use tiny_agent::internal::registry::{
    default_tools, parse_tool_list, select_tools, DEFAULT_TOOL_NAMES,
};
use tiny_agent::{load_config, Agent, AgentConfig, ToolArgs};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tiny-agent")]
#[command(about = "Minimal task-execution agent", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Comma-separated list of tools to use (http, file, shell)
    #[arg(short, long, global = true)]
    tools: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent with a task
    Run {
        /// Task to execute
        task: String,
    },
    /// List all available tools
    ListTools,
    /// Execute a single tool by its registered name
    Exec {
        /// Registered tool name, e.g. shell_command
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,
    },
    /// Start an interactive shell with the agent
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config();
    config.verbose |= cli.verbose;
    if let Some(list) = &cli.tools {
        config.tools = Some(parse_tool_list(list));
    }

    // The interactive shell always logs what the agent does
    if matches!(cli.command, Commands::Shell) {
        config.verbose = true;
    }
    init_tracing(config.verbose);

    match &cli.command {
        Commands::Run { task } => {
            let agent = build_agent(&config).await?;
            println!("Running task: {}", task);
            println!("Available tools: {:?}", agent.tool_names().await);

            let result = agent.run(task).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::ListTools => list_tools(&config),
        Commands::Exec { tool, args } => {
            let agent = build_agent(&config).await?;
            let args = parse_args(args.as_deref())?;
            let result = agent.execute_tool(tool, args).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Shell => {
            let agent = build_agent(&config).await?;
            interactive_shell(&agent).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "tiny_agent=info"
    } else {
        "tiny_agent=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn build_agent(config: &AgentConfig) -> anyhow::Result<Agent> {
    let agent = Agent::new(config.name.clone());
    for tool in select_tools(config.tools.as_deref(), config)? {
        agent.register_tool(tool).await?;
    }
    Ok(agent)
}

fn parse_args(raw: Option<&str>) -> anyhow::Result<ToolArgs> {
    let Some(raw) = raw else {
        return Ok(ToolArgs::new());
    };
    let value = serde_json::from_str::<serde_json::Value>(raw)
        .context("Tool arguments must be valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => anyhow::bail!("Tool arguments must be a JSON object, got {}", other),
    }
}

fn list_tools(config: &AgentConfig) {
    let tools = default_tools(config);
    println!("{:<8} {:<18} DESCRIPTION", "KEY", "NAME");
    for key in DEFAULT_TOOL_NAMES {
        if let Some(tool) = tools.get(*key) {
            println!("{:<8} {:<18} {}", key, tool.name(), tool.description());
        }
    }
}

async fn interactive_shell(agent: &Agent) -> anyhow::Result<()> {
    println!("Tiny Agent Interactive Shell");
    println!("Type 'exit' to quit, 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("tiny-agent> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" => break,
            "help" => {
                println!("Available commands:");
                println!("  help - Show this help");
                println!("  exit - Exit the shell");
                println!("  tools - List available tools");
                println!("  memory - Show memory contents");
                println!("  <task> - Execute a task");
            }
            "tools" => println!("Tools: {:?}", agent.tool_names().await),
            "memory" => println!("Memory keys: {:?}", agent.memory().await.list_keys()),
            _ => {
                let result = agent.run(input).await;
                println!("Result: {}", serde_json::to_string(&result)?);
            }
        }
    }

    println!("Exiting...");
    Ok(())
}
