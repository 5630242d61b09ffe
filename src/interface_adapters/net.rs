// Connection loop: dials the game server, pumps frames and timers into the
// session state machine and repaints after every stimulus. Reconnection is
// driven by the session's own reconnect timer, so the one-second cadence
// also holds while the process sits disconnected.

use crate::domain::ports::{AudioTrigger, Canvas, Shell};
use crate::interface_adapters::protocol::OutboundCommand;
use crate::use_cases::session::{Client, TimerOutcome};
use crate::use_cases::view::ViewAssets;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum LoopControl {
    Continue,
    Disconnect,
}

/// Poll ceiling while no timer is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Drives one client session until it neither holds a connection nor wants
/// another attempt. Input arrives through `commands_rx`; a closed sender
/// stops input without tearing the session down.
pub async fn run_client<S, A, C>(
    url: String,
    mut client: Client<S, A>,
    mut canvas: C,
    assets: ViewAssets,
    mut commands_rx: mpsc::Receiver<OutboundCommand>,
) where
    S: Shell,
    A: AudioTrigger,
    C: Canvas,
{
    let mut commands_closed = false;
    loop {
        match connect_async(url.as_str()).await {
            Ok((mut socket, _)) => {
                info!(url = %url, "connected");
                let opening = client.on_open(Instant::now());
                for command in opening {
                    send_command(&mut socket, &command).await;
                }
                run_connected(
                    &mut socket,
                    &mut client,
                    &mut canvas,
                    &assets,
                    &mut commands_rx,
                    &mut commands_closed,
                )
                .await;
                client.on_close(Instant::now());
            }
            Err(e) => {
                warn!(error = %e, "connect failed");
                client.on_error(Instant::now());
                client.on_close(Instant::now());
            }
        }
        redraw_if_needed(&mut client, &mut canvas, &assets);

        if !client.wants_reconnect() {
            info!("session over");
            return;
        }
        wait_for_reconnect(&mut client, &mut canvas, &assets).await;
    }
}

async fn run_connected<S, A, C>(
    socket: &mut WsStream,
    client: &mut Client<S, A>,
    canvas: &mut C,
    assets: &ViewAssets,
    commands_rx: &mut mpsc::Receiver<OutboundCommand>,
    commands_closed: &mut bool,
) where
    S: Shell,
    A: AudioTrigger,
    C: Canvas,
{
    loop {
        redraw_if_needed(client, canvas, assets);
        let deadline = client
            .timers
            .next_deadline()
            .unwrap_or_else(|| Instant::now() + IDLE_POLL);

        let control = tokio::select! {
            incoming = socket.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let replies = client.on_frame(text.as_str(), Instant::now());
                    for command in replies {
                        send_command(socket, &command).await;
                    }
                    LoopControl::Continue
                }
                Some(Ok(Message::Close(_))) => {
                    info!("server closed the connection");
                    LoopControl::Disconnect
                }
                Some(Ok(_)) => LoopControl::Continue,
                Some(Err(e)) => {
                    warn!(error = %e, "websocket recv error");
                    LoopControl::Disconnect
                }
                None => {
                    info!("websocket stream ended");
                    LoopControl::Disconnect
                }
            },

            _ = sleep_until(deadline) => {
                run_due_timers(socket, client).await;
                LoopControl::Continue
            }

            command = commands_rx.recv(), if !*commands_closed => {
                match command {
                    Some(command) => {
                        send_command(socket, &command).await;
                        LoopControl::Continue
                    }
                    None => {
                        debug!("command channel closed");
                        *commands_closed = true;
                        LoopControl::Continue
                    }
                }
            }
        };

        if let LoopControl::Disconnect = control {
            return;
        }
    }
}

async fn run_due_timers<S, A>(socket: &mut WsStream, client: &mut Client<S, A>)
where
    S: Shell,
    A: AudioTrigger,
{
    let now = Instant::now();
    for (_, tag) in client.timers.fire_due(now) {
        match client.on_timer(tag, now) {
            TimerOutcome::Send(command) => send_command(socket, &command).await,
            // A reconnect firing while connected has nothing to do.
            TimerOutcome::Reconnect | TimerOutcome::None => {}
        }
    }
}

/// Runs timers while disconnected until the reconnect delay elapses.
async fn wait_for_reconnect<S, A, C>(client: &mut Client<S, A>, canvas: &mut C, assets: &ViewAssets)
where
    S: Shell,
    A: AudioTrigger,
    C: Canvas,
{
    while client.wants_reconnect() {
        let deadline = client
            .timers
            .next_deadline()
            .unwrap_or_else(|| Instant::now() + IDLE_POLL);
        sleep_until(deadline).await;
        let now = Instant::now();
        for (_, tag) in client.timers.fire_due(now) {
            match client.on_timer(tag, now) {
                TimerOutcome::Reconnect => return,
                // Sends are dropped while the connection is down.
                TimerOutcome::Send(_) | TimerOutcome::None => {}
            }
        }
        redraw_if_needed(client, canvas, assets);
    }
}

/// Sends one command. Failures are logged, not fatal; the recv side of the
/// loop notices a dead socket immediately after. A lost ping echo only
/// delays the next latency reading, so it does not warrant a warning.
async fn send_command(socket: &mut WsStream, command: &OutboundCommand) {
    let encoded = command.encode();
    if let Err(e) = socket.send(Message::text(encoded)).await {
        if matches!(command, OutboundCommand::PingEcho { .. }) {
            debug!(error = %e, "ping echo dropped");
        } else {
            warn!(error = %e, command = ?command, "failed to send");
        }
    }
}

fn redraw_if_needed<S, A, C>(client: &mut Client<S, A>, canvas: &mut C, assets: &ViewAssets)
where
    S: Shell,
    A: AudioTrigger,
    C: Canvas,
{
    if client.needs_redraw() {
        client.redraw(canvas, assets);
    }
}
