//! ZapCampaigns command line client
//!
//! Main application entry point

mod cli;

use std::path::Path;

use anyhow::{bail, Context};
use chrono::Local;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use ZapCampaigns::{
    config::Settings,
    models::{CampaignPatch, GroupSettings, Message, NewCampaign, NewInstance, NewTemplate},
    services::{
        campaigns, groups, messages::media_message, templates, AuthService, BatchReport, CampaignQuery, GroupQuery,
        ServiceFactory,
    },
    state::{GroupEntry, Selection},
    utils::{helpers, logging},
};

use cli::{CampaignCommand, Cli, Command, GroupCommand, InstanceCommand, MessagesArgs, SendCommand, TemplateCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_file(&cli.config).context("Failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;
    info!("Starting {}", ZapCampaigns::info());

    let services = ServiceFactory::new(&settings)?;

    if requires_session(&cli.command) && AuthService::load_session(&cli.session).await?.is_none() {
        bail!("Not logged in, run `zapcampaigns login <username>` first");
    }

    if let Command::Groups { groups_cmd } = &cli.command {
        if groups_cmd.reads_cache() {
            services.warm_up().await;
        }
    }

    match cli.command {
        Command::Login { username, password } => {
            let session = services.auth_service.login(&username, &password).await?;
            AuthService::save_session(&session, &cli.session).await?;
            println!("Logged in as {}", session.username);
        }
        Command::Logout => {
            AuthService::logout(&cli.session).await?;
            println!("Logged out");
        }
        Command::Health => {
            let status = services.health_check().await;
            print_json(&status)?;
            if !status.is_healthy() {
                bail!("Unhealthy: {}", status.get_issues().join("; "));
            }
        }
        Command::Instances { instances_cmd } => run_instances(&services, instances_cmd).await?,
        Command::Templates { templates_cmd } => run_templates(&services, templates_cmd).await?,
        Command::Groups { groups_cmd } => run_groups(&services, groups_cmd).await?,
        Command::Campaigns { campaigns_cmd } => run_campaigns(&services, campaigns_cmd).await?,
        Command::Send { send_cmd } => run_send(&services, send_cmd).await?,
        Command::Trigger { once } => {
            let Some(trigger) = services.trigger_service.clone() else {
                bail!("Trigger is disabled, set trigger.enabled and trigger.url");
            };
            if once {
                trigger.fire().await?;
                println!("Trigger fired");
            } else {
                let stats = trigger
                    .run(async {
                        if let Err(e) = tokio::signal::ctrl_c().await {
                            warn!(error = %e, "Failed to listen for ctrl-c");
                        }
                    })
                    .await;
                print_json(&serde_json::json!({ "fired": stats.fired, "failed": stats.failed }))?;
            }
        }
    }

    Ok(())
}

/// Commands that only make sense for a signed-in operator
fn requires_session(command: &Command) -> bool {
    !matches!(
        command,
        Command::Login { .. } | Command::Logout | Command::Health | Command::Trigger { .. }
    )
}

async fn run_instances(services: &ServiceFactory, cmd: InstanceCommand) -> anyhow::Result<()> {
    let instances = &services.instance_service;
    match cmd {
        InstanceCommand::List => print_json(&instances.list().await?)?,
        InstanceCommand::Save { name, url, api_key } => {
            instances.save(&NewInstance { name, url, api_key }).await?;
            println!("Instance saved");
        }
        InstanceCommand::Delete { id } => {
            instances.delete(&id).await?;
            println!("Instance {} deleted", id);
        }
    }
    Ok(())
}

async fn run_templates(services: &ServiceFactory, cmd: TemplateCommand) -> anyhow::Result<()> {
    let service = &services.template_service;
    match cmd {
        TemplateCommand::List { filter } => {
            let all = service.list().await?;
            print_json(&templates::filter_and_sort(&all, &filter))?;
        }
        TemplateCommand::Show { id } => print_json(&service.find(&id).await?)?,
        TemplateCommand::Save { file } => {
            service.save(&read_json::<NewTemplate>(&file).await?).await?;
            println!("Template saved");
        }
        TemplateCommand::Update { id, file } => {
            service.update(&id, &read_json::<NewTemplate>(&file).await?).await?;
            println!("Template {} updated", id);
        }
        TemplateCommand::Duplicate { id } => {
            let mut copy = NewTemplate::from(&service.find(&id).await?);
            copy.name = format!("{} - Copy", copy.name);
            service.save(&copy).await?;
            println!("Saved {}", copy.name);
        }
        TemplateCommand::Delete { id } => {
            service.delete(&id).await?;
            println!("Template {} deleted", id);
        }
    }
    Ok(())
}

async fn run_groups(services: &ServiceFactory, cmd: GroupCommand) -> anyhow::Result<()> {
    let service = &services.group_service;
    match cmd {
        GroupCommand::List { instance, filter, admin_only, sort } => {
            let all = service.list(&instance).await?;
            let query = GroupQuery { name: filter, admin_only, sort: sort.into() };
            print_json(&groups::filter_and_sort(&all, &query))?;
        }
        GroupCommand::Preload => {
            let summary = services.cache.preload_all().await.unwrap_or_default();
            if let Some(error) = services.cache.load_error() {
                bail!("Group preload failed: {}", error);
            }
            print_json(&serde_json::json!({
                "summary": summary,
                "entries": services.cache.snapshot().await,
            }))?;
        }
        GroupCommand::Stats { instance } => {
            let listed = match services.cache.get(&instance).await {
                GroupEntry::Loaded(groups) => groups,
                _ => service.list(&instance).await?,
            };
            print_json(&groups::statistics(&listed))?;
        }
        GroupCommand::Settings { instance, group, settings } => {
            let current = service.current_settings(&instance, &group).await?;
            service.update_settings(&instance, &group, &settings.apply(current)).await?;
            println!("Settings updated");
        }
        GroupCommand::Photo { instance, group, file } => {
            let photo = read_photo(&file).await?;
            service.update_photo(&instance, &group, &photo).await?;
            println!("Photo updated");
        }
        GroupCommand::Invite { instance, group } => {
            println!("{}", service.invite_link(&instance, &group).await?);
        }
        GroupCommand::BulkUpdate { instance, groups, all, settings, photo } => {
            let photo = match photo {
                Some(file) => Some(read_photo(&file).await?),
                None => None,
            };
            let groups = if all {
                let listed = service.list(&instance).await?;
                let mut selection = Selection::new();
                selection.toggle_all(listed.iter().filter(|g| g.is_admin).map(|g| g.id.as_str()));
                selection.ids().to_vec()
            } else {
                selected(groups)
            };
            let report = service
                .bulk_update(&instance, &groups, &settings.apply(GroupSettings::default()), photo.as_deref())
                .await?;
            print_report(&report)?;
        }
    }
    Ok(())
}

async fn run_campaigns(services: &ServiceFactory, cmd: CampaignCommand) -> anyhow::Result<()> {
    let service = &services.campaign_service;
    match cmd {
        CampaignCommand::List { filter, status, sort } => {
            let mut all = service.list().await?;
            if all.iter().any(|c| c.template_name.is_none()) {
                campaigns::attach_template_names(&mut all, &services.template_service.list().await?);
            }
            let query = CampaignQuery { name: filter, status, sort: sort.into() };
            print_json(&campaigns::filter_and_sort(&all, &query))?;
        }
        CampaignCommand::Schedule { name, instance, template, groups, date, time } => {
            let campaign = NewCampaign {
                name,
                instance_id: instance,
                template_id: template,
                group_ids: groups,
                scheduled_at: helpers::parse_schedule(&date, &time)?,
            };
            service.schedule(&campaign).await?;
            println!("Campaign scheduled for {}", helpers::format_timestamp(campaign.scheduled_at));
        }
        CampaignCommand::Update { id, name, instance, template, groups, date, time } => {
            let scheduled_at = match (date, time) {
                (Some(date), Some(time)) => Some(helpers::parse_schedule(&date, &time)?),
                _ => None,
            };
            let patch = CampaignPatch {
                name,
                instance_id: instance,
                template_id: template,
                group_ids: groups,
                scheduled_at,
            };
            service.update(&id, &patch).await?;
            println!("Campaign {} updated", id);
        }
        CampaignCommand::Status { id, status } => {
            service.update_status(&id, status).await?;
            println!("Campaign {} is now {}", id, status);
        }
        CampaignCommand::BulkStatus { status, ids } => {
            print_report(&service.bulk_update_status(&selected(ids), status).await?)?;
        }
        CampaignCommand::BulkReschedule { date, time, ids } => {
            let scheduled_at = helpers::parse_schedule(&date, &time)?;
            print_report(&service.bulk_reschedule(&selected(ids), scheduled_at).await?)?;
        }
        CampaignCommand::Duplicate { id } => {
            let original = service
                .list()
                .await?
                .into_iter()
                .find(|c| c.id == id)
                .with_context(|| format!("Campaign {} not found", id))?;
            let copy = campaigns::duplicate(&original, Local::now());
            service.schedule(&copy).await?;
            println!("Scheduled {} for {}", copy.name, helpers::format_timestamp(copy.scheduled_at));
        }
        CampaignCommand::Delete { id } => {
            service.delete(&id).await?;
            println!("Campaign {} deleted", id);
        }
    }
    Ok(())
}

async fn run_send(services: &ServiceFactory, cmd: SendCommand) -> anyhow::Result<()> {
    let service = &services.message_service;
    match cmd {
        SendCommand::Bulk { instance, groups, messages, each } => {
            let groups = selected(groups);
            let messages = load_messages(services, messages).await?;
            if each {
                print_report(&service.send_each(&instance, &groups, &messages).await?)?;
            } else {
                service.send_bulk(&instance, &groups, &messages).await?;
                println!("Messages submitted to {} groups", groups.len());
            }
        }
        SendCommand::Messages { instance, group, messages } => {
            let messages = load_messages(services, messages).await?;
            service.send(&instance, &group, &messages).await?;
            println!("Messages sent");
        }
        SendCommand::Realtime { instance, group, text } => {
            service.send_realtime(&instance, &group, &Message::text(text)).await?;
            println!("Message sent");
        }
        SendCommand::Media { instance, groups, file, caption } => {
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .with_context(|| format!("{} is not a file", file.display()))?;
            let message = media_message(&file_name, &caption);
            match groups.as_slice() {
                [group] => service.send_media(&instance, group, &message, &file).await?,
                _ => service.send_bulk_media(&instance, &groups, &message, &file).await?,
            }
            println!("Media sent to {} groups", groups.len());
        }
    }
    Ok(())
}

async fn load_messages(services: &ServiceFactory, args: MessagesArgs) -> anyhow::Result<Vec<Message>> {
    if let Some(file) = args.file {
        return read_json(&file).await;
    }
    if let Some(id) = args.template {
        return Ok(services.template_service.find(&id).await?.messages);
    }
    match args.text {
        Some(text) => Ok(vec![Message::text(text)]),
        None => bail!("Provide --file, --template or --text"),
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(file: &Path) -> anyhow::Result<T> {
    let data = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Invalid JSON in {}", file.display()))
}

async fn read_photo(file: &Path) -> anyhow::Result<String> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(helpers::encode_base64(&bytes))
}

/// Deduplicated ids, in the order given
fn selected(ids: Vec<String>) -> Vec<String> {
    ids.into_iter().collect::<Selection>().ids().to_vec()
}

fn print_report(report: &BatchReport) -> anyhow::Result<()> {
    print_json(report)?;
    eprintln!("{}", report.summary());
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
