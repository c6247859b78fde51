//! Interactive chat REPL.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use aion_core::agents::{chatbot, Stores};
use aion_core::config::AionConfig;
use aion_core::{ConversationHistory, HistoryStore, Orchestrator, ProfileStore, Session};
use aion_provider_gemini::GeminiGateway;
use aion_storage_fs::{FsBudgetStore, FsExpenseStore, FsHistoryStore, FsProfileStore};

pub async fn run_chat_mode(config: AionConfig) -> Result<()> {
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        eprintln!("Run `aion config init` to set up your configuration.");
        std::process::exit(1);
    }

    let user_dir = config.user_data_dir()?;
    let stores = Stores {
        profile: Arc::new(FsProfileStore::new(&user_dir)),
        budgets: Arc::new(FsBudgetStore::new(&user_dir)),
        expenses: Arc::new(FsExpenseStore::new(&user_dir)),
    };
    let history_store = FsHistoryStore::new(&user_dir);

    let api_key = config
        .resolve_api_key()
        .context("no Gemini API key configured")?;
    let gateway = Arc::new(GeminiGateway::new(&api_key, &config.gemini.model));

    let spec = chatbot::spec(&stores, gateway.clone(), config.agent.max_rounds)
        .context("failed to build the agent set")?;
    let orchestrator = Orchestrator::new(gateway);

    let restored = history_store.load(spec.name()).await.unwrap_or_default();
    let restored_count = restored.len();
    let mut session = Session::new(spec.name(), ConversationHistory::from_turns(restored));

    info!(user = %config.storage.user, model = %config.gemini.model, "starting chat");
    eprintln!("Aion — personal finance assistant");
    eprintln!("  Model: {} | User: {}", config.gemini.model, config.storage.user);
    if restored_count > 0 {
        eprintln!("  Conversation: {} turns restored", restored_count);
    }
    eprintln!("  Type /help for commands, /quit to exit\n");

    let stdin = tokio::io::stdin();
    let reader = tokio::io::BufReader::new(stdin);
    let mut lines = tokio::io::AsyncBufReadExt::lines(reader);

    loop {
        eprint!("> ");
        let line = match lines.next_line().await? {
            Some(l) => l.trim().to_string(),
            None => break,
        };

        if line.is_empty() {
            continue;
        }

        if line.starts_with('/') {
            match line.as_str() {
                "/quit" | "/exit" | "/q" => {
                    eprintln!("Goodbye!");
                    break;
                }
                "/help" | "/h" => {
                    eprintln!("Available commands:");
                    eprintln!("  /profile - Show the stored financial profile");
                    eprintln!("  /clear   - Clear the conversation history");
                    eprintln!("  /help    - Show this help");
                    eprintln!("  /quit    - Exit");
                }
                "/profile" => match stores.profile.get().await {
                    Ok(profile) => {
                        eprintln!("  monthly income: {:.2}", profile.monthly_income);
                        eprintln!("  savings:        {:.2}", profile.savings);
                        eprintln!("  investments:    {:.2}", profile.investments);
                        eprintln!("  debts:          {:.2}", profile.debts);
                    }
                    Err(e) => eprintln!("Failed to read profile: {}", e),
                },
                "/clear" => {
                    session.history = ConversationHistory::new();
                    if let Err(e) = history_store.save(spec.name(), &[]).await {
                        eprintln!("Failed to clear saved history: {}", e);
                    } else {
                        eprintln!("Conversation cleared.");
                    }
                }
                _ => {
                    eprintln!("Unknown command: {}. Type /help for available commands.", line);
                }
            }
            continue;
        }

        // A fresh conversation gets the profile prepended to its first
        // message so the model has the numbers up front.
        let message = if session.history.is_empty() {
            let profile = stores.profile.get().await.unwrap_or_default();
            chatbot::compose_first_message(&profile, &line)
        } else {
            line
        };

        session.begin_run()?;
        let cancel_token = session.cancel_token.clone();
        let run = orchestrator
            .run(&spec, &mut session.history, &message, &cancel_token)
            .await;
        session.finish_run();

        match run {
            Ok(run) => {
                println!("\n{}\n", chatbot::strip_html_tags(&run.final_text).trim());
                if let Err(e) = history_store
                    .save(spec.name(), session.history.turns())
                    .await
                {
                    error!(err = %e, "failed to persist conversation");
                }
            }
            Err(e) => {
                error!(err = %e, "orchestration run failed");
                eprintln!("Sorry, something went wrong handling that. Please try again.");
            }
        }
    }

    Ok(())
}
