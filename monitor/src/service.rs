use std::{
    io::ErrorKind,
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, OnceLock},
    time::{Duration, Instant},
};

use anyhow::Context;
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use tokio::{
    net::TcpListener,
    sync::{mpsc, Mutex},
};
use tracing::{debug, info, warn};

use heatwatch_common::{
    AlertEvent, HeatBand, MonitorAction, MonitorEngine, ReportSnapshot, RuntimeConfig,
    TOPIC_ADVISORY, TOPIC_ALERT, TOPIC_READING_HEAT_INDEX, TOPIC_READING_HUMIDITY,
    TOPIC_READING_TEMPERATURE, TOPIC_STATE, TOPIC_STATUS,
};

use crate::{
    indicator::{Indicator, LogIndicator},
    report::HttpReporter,
    sensor::{Sensor, SimulatedSensor},
};

const MAX_MQTT_PAYLOAD_BYTES: usize = 512;

#[derive(Clone)]
struct AppState {
    engine: Arc<Mutex<MonitorEngine>>,
    mqtt: AsyncClient,
}

#[derive(Debug)]
struct AdvisoryEvent {
    payload: String,
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut runtime = load_runtime_config().await.unwrap_or_else(|err| {
        warn!("failed to load runtime config: {err:#}");
        RuntimeConfig::default()
    });
    runtime.sanitize();
    apply_env_overrides(&mut runtime);
    runtime.validate().context("invalid runtime config")?;

    let engine = MonitorEngine::new(runtime.monitor.clone());

    let mut mqtt_options = MqttOptions::new(
        "heatwatch-monitor",
        runtime.network.mqtt_host.clone(),
        runtime.network.mqtt_port,
    );
    if !runtime.network.mqtt_user.is_empty() {
        mqtt_options.set_credentials(
            runtime.network.mqtt_user.clone(),
            runtime.network.mqtt_pass.clone(),
        );
    }

    let (mqtt, eventloop) = AsyncClient::new(mqtt_options, 64);

    let app_state = AppState {
        engine: Arc::new(Mutex::new(engine)),
        mqtt,
    };

    app_state
        .mqtt
        .subscribe(TOPIC_ADVISORY, QoS::AtMostOnce)
        .await
        .context("failed to subscribe to advisory topic")?;
    app_state
        .mqtt
        .publish(TOPIC_STATUS, QoS::AtLeastOnce, true, "online")
        .await
        .context("failed to publish online status")?;

    let reporter = HttpReporter::new(
        runtime.report.endpoint.clone(),
        runtime.report.token.clone(),
    )?;
    let (advisory_tx, advisory_rx) = mpsc::channel::<AdvisoryEvent>(16);

    spawn_mqtt_loop(eventloop, advisory_tx);
    spawn_control_loop(
        app_state.clone(),
        runtime.monitor.tick_interval_ms,
        advisory_rx,
        reporter,
        SimulatedSensor::from_env(),
        LogIndicator::new(),
    );
    spawn_state_publish_loop(app_state.clone(), runtime.monitor.state_publish_interval_ms);

    let app = Router::new()
        .route("/api/status", get(handle_get_status))
        .with_state(app_state);

    let port = std::env::var("MONITOR_HTTP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse().unwrap();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind monitor server at {addr}"))?;

    info!("monitor listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn load_runtime_config() -> anyhow::Result<RuntimeConfig> {
    let path = std::env::var("HEATWATCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./heatwatch.json"));

    match tokio::fs::read(&path).await {
        Ok(raw) => Ok(serde_json::from_slice::<RuntimeConfig>(&raw)?),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(RuntimeConfig::default()),
        Err(err) => Err(err.into()),
    }
}

fn apply_env_overrides(runtime: &mut RuntimeConfig) {
    if let Ok(host) = std::env::var("MQTT_HOST") {
        runtime.network.mqtt_host = host;
    }
    if let Some(port) = std::env::var("MQTT_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
    {
        runtime.network.mqtt_port = port;
    }
    if let Ok(user) = std::env::var("MQTT_USER") {
        runtime.network.mqtt_user = user;
    }
    if let Ok(pass) = std::env::var("MQTT_PASS") {
        runtime.network.mqtt_pass = pass;
    }
    if let Ok(endpoint) = std::env::var("REPORT_URL") {
        runtime.report.endpoint = endpoint;
    }
    if let Ok(token) = std::env::var("REPORT_TOKEN") {
        runtime.report.token = token;
    }
}

fn spawn_mqtt_loop(mut eventloop: rumqttc::EventLoop, advisory_tx: mpsc::Sender<AdvisoryEvent>) {
    tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::Publish(message))) => {
                    if let Err(err) =
                        handle_mqtt_message(&advisory_tx, message.topic, message.payload.to_vec())
                            .await
                    {
                        warn!("mqtt message handling error: {err:#}");
                    }
                }
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    info!("mqtt connected");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("mqtt poll error: {err}");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    });
}

// The broker callback never touches the engine directly; advisories are
// queued to the control loop so engine state has a single writer.
async fn handle_mqtt_message(
    advisory_tx: &mpsc::Sender<AdvisoryEvent>,
    topic: String,
    payload: Vec<u8>,
) -> anyhow::Result<()> {
    if payload.len() > MAX_MQTT_PAYLOAD_BYTES {
        warn!(
            "dropping oversized MQTT payload on topic {} ({} bytes)",
            topic,
            payload.len()
        );
        return Ok(());
    }

    let message = String::from_utf8(payload).context("non utf8 mqtt payload")?;

    if topic.as_str() == TOPIC_ADVISORY {
        advisory_tx
            .send(AdvisoryEvent { payload: message })
            .await
            .context("advisory queue closed")?;
    }

    Ok(())
}

fn spawn_control_loop(
    app_state: AppState,
    tick_interval_ms: u64,
    mut advisory_rx: mpsc::Receiver<AdvisoryEvent>,
    reporter: HttpReporter,
    mut sensor: impl Sensor + Send + 'static,
    mut indicator: impl Indicator + Send + 'static,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(tick_interval_ms));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now_ms = monotonic_ms();
                    let sample = sensor.sample();
                    let actions = {
                        let mut engine = app_state.engine.lock().await;
                        engine.tick(sample, now_ms)
                    };
                    execute_actions(&app_state, &reporter, &mut indicator, actions).await;
                }
                event = advisory_rx.recv() => {
                    let Some(event) = event else {
                        warn!("advisory queue closed; control loop exiting");
                        break;
                    };
                    let (engaged, levels) = {
                        let mut engine = app_state.engine.lock().await;
                        let engaged = engine.apply_advisory(&event.payload, monotonic_ms());
                        (engaged, engine.indicator_levels())
                    };
                    if engaged {
                        info!("advisory override engaged: {}", event.payload);
                        indicator.apply(levels);
                    } else {
                        debug!("advisory ignored: {}", event.payload);
                    }
                }
            }
        }
    });
}

fn spawn_state_publish_loop(app_state: AppState, publish_interval_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(publish_interval_ms));
        loop {
            interval.tick().await;

            let now_ms = monotonic_ms();
            let payload = {
                let engine = app_state.engine.lock().await;
                serde_json::to_vec(&engine.state_payload(now_ms))
            };

            match payload {
                Ok(body) => {
                    if let Err(err) = app_state
                        .mqtt
                        .publish(TOPIC_STATE, QoS::AtLeastOnce, true, body)
                        .await
                    {
                        warn!("monitor state publish failed: {err}");
                    }
                }
                Err(err) => warn!("monitor state serialization failed: {err}"),
            }
        }
    });
}

async fn execute_actions(
    app_state: &AppState,
    reporter: &HttpReporter,
    indicator: &mut impl Indicator,
    actions: Vec<MonitorAction>,
) {
    for action in actions {
        match action {
            MonitorAction::SetIndicator(levels) => indicator.apply(levels),
            MonitorAction::RaiseAlert { band, heat_index } => {
                publish_alert(app_state, band, heat_index).await;
            }
            MonitorAction::SendReport(snapshot) => {
                publish_readings(app_state, &snapshot).await;
                reporter.post_temperature(snapshot.temperature_f).await;
            }
        }
    }
}

async fn publish_alert(app_state: &AppState, band: HeatBand, heat_index: f32) {
    info!("alert raised: {} at heat index {heat_index:.1}", band.as_str());

    let event = AlertEvent {
        band: band.as_str(),
        heat_index,
        raised_at: Utc::now().to_rfc3339(),
    };
    match serde_json::to_vec(&event) {
        Ok(body) => {
            if let Err(err) = app_state
                .mqtt
                .publish(TOPIC_ALERT, QoS::AtLeastOnce, false, body)
                .await
            {
                warn!("alert publish failed: {err}");
            }
        }
        Err(err) => warn!("alert serialization failed: {err}"),
    }
}

async fn publish_readings(app_state: &AppState, snapshot: &ReportSnapshot) {
    let temp_payload = format!("{:.1}", snapshot.temperature_f);
    if let Err(err) = app_state
        .mqtt
        .publish(
            TOPIC_READING_TEMPERATURE,
            QoS::AtLeastOnce,
            true,
            temp_payload,
        )
        .await
    {
        warn!("temperature reading publish failed: {err}");
    }

    let index_payload = format!("{:.1}", snapshot.heat_index);
    if let Err(err) = app_state
        .mqtt
        .publish(
            TOPIC_READING_HEAT_INDEX,
            QoS::AtLeastOnce,
            true,
            index_payload,
        )
        .await
    {
        warn!("heat index reading publish failed: {err}");
    }

    // Humidity rides the wire as a fraction, not a percent.
    let humidity_payload = format!("{:.2}", snapshot.humidity);
    if let Err(err) = app_state
        .mqtt
        .publish(
            TOPIC_READING_HUMIDITY,
            QoS::AtLeastOnce,
            true,
            humidity_payload,
        )
        .await
    {
        warn!("humidity reading publish failed: {err}");
    }
}

async fn handle_get_status(State(state): State<AppState>) -> impl IntoResponse {
    let now_ms = monotonic_ms();
    let status = {
        let engine = state.engine.lock().await;
        engine.status(now_ms)
    };
    Json(status)
}

fn monotonic_ms() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START
        .get_or_init(Instant::now)
        .elapsed()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}
