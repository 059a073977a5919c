//! The scenario execution push protocol (spec §4.2 "Push protocol", §6): a
//! persistent bidirectional WebSocket with a real `WebSocketUpgrade`
//! that switches protocols and then splits into a read half (client
//! control messages) and a write half (broadcast events).

use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use scenario_exec::{ClientMessage, ExecutionEvent};
use tokio::sync::mpsc;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ExecutionEvent>();

    send_event(&mut sink, &ExecutionEvent::Connected { message: "connected".to_string() }).await;

    let mut subscriptions: Vec<(String, scenario_exec::SubscriberId)> = Vec::new();

    loop {
        tokio::select! {
            outgoing = rx.recv() => {
                match outgoing {
                    Some(event) => send_event(&mut sink, &event).await,
                    None => break,
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Subscribe { execution_id }) => {
                                match state.scenario_service.subscribe(&execution_id, tx.clone()) {
                                    Some(id) => {
                                        subscriptions.push((execution_id.clone(), id));
                                        send_event(
                                            &mut sink,
                                            &ExecutionEvent::Subscribed { execution_id },
                                        )
                                        .await;
                                    }
                                    None => {
                                        send_event(
                                            &mut sink,
                                            &ExecutionEvent::Error {
                                                execution_id,
                                                message: "no such live execution".to_string(),
                                            },
                                        )
                                        .await;
                                    }
                                }
                            }
                            Ok(ClientMessage::Unsubscribe { execution_id }) => {
                                subscriptions.retain(|(id, sub_id)| {
                                    if *id == execution_id {
                                        state.scenario_service.unsubscribe(id, *sub_id);
                                        false
                                    } else {
                                        true
                                    }
                                });
                                send_event(
                                    &mut sink,
                                    &ExecutionEvent::Unsubscribed { execution_id },
                                )
                                .await;
                            }
                            Err(_) => {
                                let _ = sink
                                    .send(Message::Text(
                                        serde_json::json!({
                                            "type": "error",
                                            "error": "Invalid message format",
                                        })
                                        .to_string(),
                                    ))
                                    .await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::warn!("websocket error: {e}");
                        break;
                    }
                }
            }
        }
    }

    for (execution_id, subscriber_id) in subscriptions {
        state.scenario_service.unsubscribe(&execution_id, subscriber_id);
    }
}

async fn send_event(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    event: &ExecutionEvent,
) {
    if let Ok(text) = serde_json::to_string(event) {
        let _ = sink.send(Message::Text(text)).await;
    }
}
