// Lobby room: roster bookkeeping plus the refresh chatter the server
// expects. Most events answer with a fresh `P`/`R` query instead of patching
// state locally.

use crate::domain::ports::Shell;
use crate::interface_adapters::protocol::{OutboundCommand, ServerEvent};
use crate::use_cases::context::ClientContext;
use tracing::info;

/// Applies one lobby event, returning the commands to send back.
pub fn apply(
    event: ServerEvent,
    ctx: &mut ClientContext,
    shell: &mut dyn Shell,
) -> Vec<OutboundCommand> {
    match event {
        ServerEvent::PlayersList(players) => {
            let present = players.iter().any(|p| p.name == ctx.username);
            ctx.roster.set_players(players);
            if !present {
                // The server no longer knows us, likely restarted while our
                // session was still open. Back to login.
                shell.enter_login();
            }
            Vec::new()
        }
        ServerEvent::RobotsList(robots) => {
            ctx.roster.set_robots(robots);
            Vec::new()
        }
        ServerEvent::NameChanged => {
            vec![OutboundCommand::QueryPlayers, OutboundCommand::QueryRobots]
        }
        ServerEvent::NewPlayer => vec![OutboundCommand::QueryPlayers],
        ServerEvent::NewRobot => vec![OutboundCommand::QueryRobots],
        ServerEvent::IdentityReassigned { id, address } => {
            if let Some(robot) = ctx.roster.robot_by_address_mut(&address) {
                robot.id = id;
            }
            Vec::new()
        }
        ServerEvent::OwnerChanged { id, owner } => {
            if let Some(robot) = ctx.roster.robot_mut(&id) {
                robot.owner = owner;
            }
            Vec::new()
        }
        ServerEvent::ColorChanged { id, color } => {
            if ctx.robot_id.as_deref() == Some(id.as_str()) {
                ctx.robot_color = Some(color.clone());
            }
            if let Some(robot) = ctx.roster.robot_mut(&id) {
                robot.color = Some(color);
            }
            Vec::new()
        }
        ServerEvent::PlayerRemoved { name } => {
            ctx.roster.clear_owner(&name);
            vec![OutboundCommand::QueryPlayers]
        }
        ServerEvent::RobotRemoved { id } => {
            ctx.roster.remove_robot(&id);
            Vec::new()
        }
        ServerEvent::ReadyState {
            robot_id,
            start_game,
        } => {
            info!(robot_id = %robot_id, "robot is ready");
            if start_game {
                start(ctx, shell);
            }
            Vec::new()
        }
        ServerEvent::ReadyAck => {
            shell.display_ready_message();
            Vec::new()
        }
        ServerEvent::GameStarted => {
            start(ctx, shell);
            Vec::new()
        }
        ServerEvent::PingUpdate { player_name, ms } => {
            if let Some(player) = ctx.roster.player_mut(&player_name) {
                player.ping = Some(ms);
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Latches game start and switches to the driving view; the close that
/// follows must not reconnect.
fn start(ctx: &mut ClientContext, shell: &mut dyn Shell) {
    ctx.game_ready = true;
    shell.enter_driving();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::test_support::RecordingShell;
    use crate::domain::roster::{PlayerEntry, RobotEntry};
    use crate::use_cases::context::ClientMode;

    fn ctx() -> ClientContext {
        ClientContext::new("sess".to_string(), "ana".to_string(), ClientMode::Lobby)
    }

    fn player(name: &str) -> PlayerEntry {
        PlayerEntry {
            name: name.to_string(),
            address: "10.0.0.2".to_string(),
            ping: None,
        }
    }

    fn robot(id: &str, owner: Option<&str>) -> RobotEntry {
        RobotEntry {
            id: id.to_string(),
            address: format!("addr-{id}"),
            owner: owner.map(str::to_string),
            color: None,
        }
    }

    #[test]
    fn missing_local_player_sends_us_back_to_login() {
        let mut ctx = ctx();
        let mut shell = RecordingShell::default();
        apply(
            ServerEvent::PlayersList(vec![player("bob")]),
            &mut ctx,
            &mut shell,
        );
        assert_eq!(shell.navigations, vec!["login"]);
    }

    #[test]
    fn present_local_player_stays_in_the_lobby() {
        let mut ctx = ctx();
        let mut shell = RecordingShell::default();
        apply(
            ServerEvent::PlayersList(vec![player("ana"), player("bob")]),
            &mut ctx,
            &mut shell,
        );
        assert!(shell.navigations.is_empty());
        assert_eq!(ctx.roster.players.len(), 2);
    }

    #[test]
    fn roster_change_notifications_requery_the_server() {
        let mut ctx = ctx();
        let mut shell = RecordingShell::default();
        assert_eq!(
            apply(ServerEvent::NameChanged, &mut ctx, &mut shell),
            vec![OutboundCommand::QueryPlayers, OutboundCommand::QueryRobots]
        );
        assert_eq!(
            apply(ServerEvent::NewPlayer, &mut ctx, &mut shell),
            vec![OutboundCommand::QueryPlayers]
        );
        assert_eq!(
            apply(ServerEvent::NewRobot, &mut ctx, &mut shell),
            vec![OutboundCommand::QueryRobots]
        );
    }

    #[test]
    fn removed_player_releases_their_robots_and_requeries() {
        let mut ctx = ctx();
        ctx.roster.set_robots(vec![robot("r1", Some("bob"))]);
        let mut shell = RecordingShell::default();
        let commands = apply(
            ServerEvent::PlayerRemoved {
                name: "bob".to_string(),
            },
            &mut ctx,
            &mut shell,
        );
        assert_eq!(commands, vec![OutboundCommand::QueryPlayers]);
        assert_eq!(ctx.roster.robots[0].owner, None);
    }

    #[test]
    fn identity_reassignment_matches_on_address() {
        let mut ctx = ctx();
        ctx.roster.set_robots(vec![robot("old", None)]);
        let mut shell = RecordingShell::default();
        apply(
            ServerEvent::IdentityReassigned {
                id: "new".to_string(),
                address: "addr-old".to_string(),
            },
            &mut ctx,
            &mut shell,
        );
        assert_eq!(ctx.roster.robots[0].id, "new");
    }

    #[test]
    fn ready_state_with_start_flag_enters_driving() {
        let mut ctx = ctx();
        let mut shell = RecordingShell::default();
        apply(
            ServerEvent::ReadyState {
                robot_id: "r1".to_string(),
                start_game: false,
            },
            &mut ctx,
            &mut shell,
        );
        assert!(!ctx.game_ready);
        apply(
            ServerEvent::ReadyState {
                robot_id: "r1".to_string(),
                start_game: true,
            },
            &mut ctx,
            &mut shell,
        );
        assert!(ctx.game_ready);
        assert_eq!(shell.navigations, vec!["driving"]);
    }

    #[test]
    fn ready_ack_displays_the_ready_message() {
        let mut ctx = ctx();
        let mut shell = RecordingShell::default();
        apply(ServerEvent::ReadyAck, &mut ctx, &mut shell);
        assert!(shell.ready_displayed);
    }

    #[test]
    fn ping_updates_land_in_the_roster() {
        let mut ctx = ctx();
        ctx.roster.set_players(vec![player("bob")]);
        let mut shell = RecordingShell::default();
        apply(
            ServerEvent::PingUpdate {
                player_name: "bob".to_string(),
                ms: 88,
            },
            &mut ctx,
            &mut shell,
        );
        assert_eq!(ctx.roster.players[0].ping, Some(88));
    }

    #[test]
    fn color_change_updates_roster_and_own_color() {
        let mut ctx = ctx();
        ctx.robot_id = Some("r1".to_string());
        ctx.roster.set_robots(vec![robot("r1", Some("ana"))]);
        let mut shell = RecordingShell::default();
        apply(
            ServerEvent::ColorChanged {
                id: "r1".to_string(),
                color: "green".to_string(),
            },
            &mut ctx,
            &mut shell,
        );
        assert_eq!(ctx.robot_color.as_deref(), Some("green"));
        assert_eq!(ctx.roster.robots[0].color.as_deref(), Some("green"));
    }
}
