use std::time::Duration;

use clap::Parser;
use roster_core::{RealmTopology, StaticRealmInfo};
use roster_logging::RosterSubscriberBuilder;
use roster_node::{
    Cli, CliCommand, FileFriendsApi, HostEvent, Session, SessionConfig, TokioScheduler,
};
use roster_storage::JsonFileStore;
use roster_sync::LiveFriendsList;
use tokio::sync::mpsc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging = RosterSubscriberBuilder::new()
        .with_level(cli.log_level)
        .try_init()?;

    let topology = RealmTopology::new(StaticRealmInfo::new(
        cli.realm.clone(),
        cli.connected.clone(),
    ));
    let friends = FileFriendsApi::load(&cli.friends)?;
    let live = LiveFriendsList::new(friends, topology);

    let mut config = SessionConfig::default();
    if let Some(secs) = cli.settle_secs {
        config = config.with_settle_delay(Duration::from_secs(secs));
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let mut session = Session::new(
        config,
        live,
        TokioScheduler::new(tx.clone()),
        JsonFileStore::new(&cli.store),
        &cli.character,
    )?
    .with_logging(logging.level().clone());

    tx.send(HostEvent::Login)?;
    match cli.command {
        CliCommand::Sync => {}
        CliCommand::Status => tx.send(HostEvent::Command("status".to_string()))?,
        CliCommand::Run { commands } => {
            for command in commands {
                tx.send(HostEvent::Command(command))?;
            }
        }
    }
    tx.send(HostEvent::Logout)?;

    session.run(rx, |line| println!("{line}")).await;

    session.into_live().into_api().flush()?;
    Ok(())
}
