//! Stub collaborators with call counters

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};
use weatherwise::{
    ChatClient, Coordinates, Geocoder, PipelineOptions, WeatherPipeline, WeatherProvider,
    WeatherReport,
};

/// Returns scripted replies in order and remembers every user turn
#[derive(Default)]
pub struct ScriptedChat {
    replies: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl ScriptedChat {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn user_prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedChat {
    async fn complete(&self, _system: &str, user: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(user.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(anyhow!("no scripted reply left"))
    }
}

pub struct StubGeocoder {
    result: Option<Coordinates>,
    pub queries: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl StubGeocoder {
    pub fn found(latitude: f64, longitude: f64) -> Arc<Self> {
        Arc::new(Self {
            result: Some(Coordinates::new(latitude, longitude)),
            queries: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn not_found() -> Arc<Self> {
        Arc::new(Self {
            result: None,
            queries: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.result)
    }
}

pub enum WeatherBehaviour {
    Report(WeatherReport),
    NetworkFault,
}

pub struct StubWeather {
    behaviour: WeatherBehaviour,
    pub requested: Mutex<Vec<Coordinates>>,
    pub calls: AtomicUsize,
}

impl StubWeather {
    pub fn new(behaviour: WeatherBehaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            requested: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn available(payload: Value) -> Arc<Self> {
        Self::new(WeatherBehaviour::Report(WeatherReport::Available(payload)))
    }

    pub fn failed(status: u16, body: &str) -> Arc<Self> {
        Self::new(WeatherBehaviour::Report(WeatherReport::Failed {
            status,
            body: body.to_string(),
        }))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn current_conditions(&self, coordinates: Coordinates) -> Result<WeatherReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(coordinates);
        match &self.behaviour {
            WeatherBehaviour::Report(report) => Ok(report.clone()),
            WeatherBehaviour::NetworkFault => Err(anyhow!("connection reset by peer")),
        }
    }
}

pub fn boston_fixture() -> Value {
    json!({
        "lat": 42.36,
        "lon": -71.06,
        "timezone": "America/New_York",
        "timezone_offset": -14400,
        "current": {
            "dt": 1_729_000_000,
            "temp": 16.4,
            "feels_like": 15.9,
            "humidity": 62,
            "clouds": 5,
            "wind_speed": 3.1,
            "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}]
        }
    })
}

pub fn pipeline(
    chat: &Arc<ScriptedChat>,
    geocoder: &Arc<StubGeocoder>,
    weather: &Arc<StubWeather>,
) -> WeatherPipeline {
    pipeline_with(chat, geocoder, weather, PipelineOptions::default())
}

pub fn pipeline_with(
    chat: &Arc<ScriptedChat>,
    geocoder: &Arc<StubGeocoder>,
    weather: &Arc<StubWeather>,
    options: PipelineOptions,
) -> WeatherPipeline {
    WeatherPipeline::new(chat.clone(), geocoder.clone(), weather.clone(), options)
}
