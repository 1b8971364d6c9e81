use anyhow::{Context, Result, bail};
use kinema_client::catalog::{self, ProgressStats, SearchScope, TaskFilter};
use kinema_client::config::normalize_base_url;
use kinema_client::{ClientConfig, KinemaClient, SessionState};
use kinema_model::{Difficulty, NewTopic, Task};
use log::debug;

use crate::cli::{Cli, Command, TasksArgs};

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::load().context("failed to load configuration")?;
    if let Some(server) = &cli.server {
        config.server_url = normalize_base_url(server);
    }
    debug!("[kinemactl] Using server {}", config.server_url);
    let client =
        KinemaClient::from_config(config).context("failed to set up client")?;

    match cli.command {
        Command::Login(args) => {
            let profile = client.session().login(&args.email, &args.password).await?;
            println!("Logged in as {} <{}>", profile.display_name, profile.email);
        }
        Command::Register(args) => {
            let profile = client
                .session()
                .register(&args.email, &args.password, &args.name)
                .await?;
            println!("Registered and logged in as {}", profile.email);
        }
        Command::Logout => {
            client.session().logout()?;
            println!("Logged out");
        }
        Command::Whoami => match client.session().init().await? {
            SessionState::Authenticated(profile) => println!(
                "{} <{}> ({})",
                profile.display_name, profile.email, profile.role
            ),
            _ => println!("Not logged in"),
        },
        Command::Topics => {
            let topics = track(&client, client.content().topics().await)?;
            for topic in topics {
                let class = topic
                    .school_class
                    .map(|class| class.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<24} class {:>2}  {}", topic.id, class, topic.title);
            }
        }
        Command::Tasks(args) => list_tasks(&client, args).await?,
        Command::Task { id } => {
            let task = track(&client, client.content().task(&id).await)?;
            print_task(&task);
        }
        Command::Submit { task_id, answer } => {
            let result =
                track(&client, client.content().submit_answer(&task_id, &answer).await)?;
            if result.is_accepted() {
                println!("Correct!");
            } else if result.correct == Some(false) {
                println!("Not quite, try again");
            } else {
                println!("Answer submitted");
            }
        }
        Command::Stats => {
            let tasks = track(&client, catalog::load_published(client.content()).await)?;
            let progress = track(&client, client.content().progress().await)?;
            let stats = ProgressStats::new(&tasks, &progress);
            println!(
                "Solved {}/{} ({:.1}%)",
                stats.solved,
                stats.total,
                stats.completion_percent()
            );
            for difficulty in Difficulty::all() {
                println!(
                    "  {:<8} {}",
                    difficulty.label(),
                    stats.by_difficulty.count(*difficulty)
                );
            }
        }
        Command::TopicCreate(args) => {
            require_admin(&client).await?;
            let topic = track(
                &client,
                client
                    .content()
                    .create_topic(&NewTopic {
                        title: args.title,
                        school_class: args.class,
                    })
                    .await,
            )?;
            println!("Created topic {} ({})", topic.id, topic.title);
        }
        Command::TopicDelete { id } => {
            require_admin(&client).await?;
            track(&client, client.content().delete_topic(&id).await)?;
            println!("Deleted topic {id}");
        }
        Command::TaskPublish { id } => {
            require_admin(&client).await?;
            let task = track(&client, client.content().publish_task(&id).await)?;
            println!("Published task {} ({})", task.id, task.title);
        }
        Command::TaskDelete { id } => {
            require_admin(&client).await?;
            track(&client, client.content().delete_task(&id).await)?;
            println!("Deleted task {id}");
        }
        Command::Drafts => {
            require_admin(&client).await?;
            let drafts = track(&client, client.content().draft_tasks().await)?;
            for task in drafts {
                println!("{:<24} [{}] {}", task.id, task.difficulty, task.title);
            }
        }
        Command::Users => {
            require_admin(&client).await?;
            let users = track(&client, client.users().users().await)?;
            for user in users {
                println!(
                    "{:<24} {:<6} {} <{}>",
                    user.id, user.role, user.name, user.email
                );
            }
        }
    }
    Ok(())
}

/// Update the session on `SessionExpired` and convert for `?`
fn track<T>(client: &KinemaClient, result: kinema_client::ApiResult<T>) -> Result<T> {
    Ok(client.session().track(result)?)
}

async fn require_admin(client: &KinemaClient) -> Result<()> {
    match client.session().init().await? {
        SessionState::Authenticated(profile) if profile.role.is_admin() => Ok(()),
        SessionState::Authenticated(_) => {
            bail!("this command requires an admin account")
        }
        _ => bail!("not logged in; run `kinemactl login` first"),
    }
}

async fn list_tasks(client: &KinemaClient, args: TasksArgs) -> Result<()> {
    let topics = track(client, client.content().topics().await)?;
    let tasks = track(
        client,
        catalog::load_published_for(client.content(), &topics).await,
    )?;
    let progress = track(client, client.content().progress().await)?;
    let solved = catalog::solved_task_ids(&progress);

    let filter = TaskFilter {
        search: args.search,
        scope: if args.full_text {
            SearchScope::FullText
        } else {
            SearchScope::Title
        },
        difficulty: args.difficulty,
        topic_id: args.topic,
    };
    let mut visible = filter.apply(&tasks);
    args.sort.sort(&mut visible, &topics);

    if visible.is_empty() {
        println!("No tasks match");
        return Ok(());
    }
    for task in visible {
        let mark = if solved.contains(&task.id) { "x" } else { " " };
        let class = match catalog::topic_class(&topics, &task.topic_id) {
            catalog::UNKNOWN_CLASS => "?".to_string(),
            grade => grade.to_string(),
        };
        println!(
            "[{mark}] {:<24} {:<8} class {:>2}  {}  ({})",
            task.id,
            task.difficulty.label(),
            class,
            task.title,
            catalog::topic_title(&topics, &task.topic_id)
        );
    }
    Ok(())
}

fn print_task(task: &Task) {
    println!("{} [{}]", task.title, task.difficulty);
    if !task.description.is_empty() {
        println!("\n{}", task.description);
    }
    let body = if task.body_md.is_empty() {
        &task.content
    } else {
        &task.body_md
    };
    if !body.is_empty() {
        println!("\n{body}");
    }
    if let Some(url) = &task.image_url {
        println!("\nImage: {url}");
    }
    println!("\nAnswer type: {}", task.answer_type.api_name());
}
