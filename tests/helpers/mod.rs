//! In-memory stand-ins for the store, queue and stats resolver, plus
//! helpers to serve the routers on an ephemeral port.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use hotel_guide::db::{HotelRepository, ReportRepository, StoreError};
use hotel_guide::models::hotel::{
    ContactInfo, CreateHotelRequest, Hotel, HotelOfficial, LocationStats, NewContactInfo,
};
use hotel_guide::models::report::{Report, ReportStatus};
use hotel_guide::routes::health::HealthProbe;
use hotel_guide::services::queue::{Delivery, MessageQueue, QueueError};
use hotel_guide::services::stats::{StatsError, StatsResolver};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

fn unavailable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

/// Report store backed by a `HashMap`.
#[derive(Default)]
pub struct InMemoryReportRepository {
    reports: Mutex<HashMap<Uuid, Report>>,
    pub fail_create: AtomicBool,
    pub fail_complete: AtomicBool,
    pub complete_calls: AtomicUsize,
}

impl InMemoryReportRepository {
    pub fn get(&self, id: Uuid) -> Option<Report> {
        self.reports.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn create_report(&self, report: &Report) -> Result<(), StoreError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.reports
            .lock()
            .unwrap()
            .insert(report.id, report.clone());
        Ok(())
    }

    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, StoreError> {
        Ok(self.get(id))
    }

    async fn list_reports(&self) -> Result<Vec<Report>, StoreError> {
        let mut reports: Vec<Report> = self.reports.lock().unwrap().values().cloned().collect();
        reports.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(reports)
    }

    async fn complete_report(&self, id: Uuid, stats: LocationStats) -> Result<(), StoreError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_complete.load(Ordering::SeqCst) {
            return Err(unavailable());
        }

        let mut reports = self.reports.lock().unwrap();
        let report = reports.get_mut(&id).ok_or(StoreError::NotFound {
            entity: "report",
            id,
        })?;
        report.hotel_count = stats.hotel_count;
        report.phone_count = stats.phone_count;
        report.status = ReportStatus::Completed;
        Ok(())
    }
}

/// Unbounded channel standing in for the report queue.
pub struct InMemoryQueue {
    sender: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    receiver: tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    published: Mutex<Vec<Vec<u8>>>,
    acked: Mutex<Vec<Vec<u8>>>,
    pub fail_publish: AtomicBool,
    /// Number of upcoming `receive` calls that fail with a transport error.
    pub fail_receives: AtomicUsize,
    pub receive_calls: AtomicUsize,
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
            published: Mutex::new(Vec::new()),
            acked: Mutex::new(Vec::new()),
            fail_publish: AtomicBool::new(false),
            fail_receives: AtomicUsize::new(0),
            receive_calls: AtomicUsize::new(0),
        }
    }
}

impl InMemoryQueue {
    /// Put a raw body on the queue without going through `publish`.
    pub fn inject(&self, body: &[u8]) {
        if let Some(sender) = self.sender.lock().unwrap().as_ref() {
            let _ = sender.send(body.to_vec());
        }
    }

    /// Stop accepting messages; `receive` reports `Closed` once drained.
    pub fn close(&self) {
        self.sender.lock().unwrap().take();
    }

    pub fn published(&self) -> Vec<Vec<u8>> {
        self.published.lock().unwrap().clone()
    }

    pub fn acked(&self) -> Vec<Vec<u8>> {
        self.acked.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    async fn publish(&self, payload: &[u8]) -> Result<(), QueueError> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(QueueError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection refused",
            ))));
        }
        self.published.lock().unwrap().push(payload.to_vec());
        self.inject(payload);
        Ok(())
    }

    async fn receive(&self) -> Result<Option<Delivery>, QueueError> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .fail_receives
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(QueueError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection reset",
            ))));
        }

        match self.receiver.lock().await.recv().await {
            Some(body) => Ok(Some(Delivery { body })),
            None => Err(QueueError::Closed),
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        self.acked.lock().unwrap().push(delivery.body.clone());
        Ok(())
    }
}

/// Stats resolver answering from a fixed table; unknown locations fail.
#[derive(Default)]
pub struct StubStatsResolver {
    stats: Mutex<HashMap<String, LocationStats>>,
    pub calls: AtomicUsize,
}

impl StubStatsResolver {
    pub fn with(location: &str, hotel_count: i32, phone_count: i32) -> Self {
        let resolver = Self::default();
        resolver.set(location, hotel_count, phone_count);
        resolver
    }

    pub fn set(&self, location: &str, hotel_count: i32, phone_count: i32) {
        self.stats.lock().unwrap().insert(
            location.to_string(),
            LocationStats {
                hotel_count,
                phone_count,
            },
        );
    }
}

#[async_trait]
impl StatsResolver for StubStatsResolver {
    async fn fetch_stats(&self, location: &str) -> Result<LocationStats, StatsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.stats
            .lock()
            .unwrap()
            .get(location)
            .copied()
            .ok_or_else(|| StatsError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: format!("no stats for {location}"),
            })
    }
}

/// Hotel directory backed by a `Vec`.
#[derive(Default)]
pub struct InMemoryHotelRepository {
    hotels: Mutex<Vec<Hotel>>,
}

#[async_trait]
impl HotelRepository for InMemoryHotelRepository {
    async fn create_hotel(&self, request: CreateHotelRequest) -> Result<Hotel, StoreError> {
        let id = Uuid::new_v4();
        let hotel = Hotel {
            id,
            owner_name: request.owner_name,
            owner_surname: request.owner_surname,
            company_title: request.company_title,
            contact_infos: request
                .contacts
                .into_iter()
                .map(|c| ContactInfo {
                    id: Uuid::new_v4(),
                    hotel_id: id,
                    info_type: c.info_type,
                    info_content: c.info_content,
                })
                .collect(),
        };
        self.hotels.lock().unwrap().push(hotel.clone());
        Ok(hotel)
    }

    async fn delete_hotel(&self, id: Uuid) -> Result<(), StoreError> {
        let mut hotels = self.hotels.lock().unwrap();
        let before = hotels.len();
        hotels.retain(|h| h.id != id);
        if hotels.len() == before {
            return Err(StoreError::NotFound { entity: "hotel", id });
        }
        Ok(())
    }

    async fn add_contact(
        &self,
        hotel_id: Uuid,
        contact: NewContactInfo,
    ) -> Result<ContactInfo, StoreError> {
        let mut hotels = self.hotels.lock().unwrap();
        let hotel = hotels
            .iter_mut()
            .find(|h| h.id == hotel_id)
            .ok_or(StoreError::NotFound {
                entity: "hotel",
                id: hotel_id,
            })?;
        let contact = ContactInfo {
            id: Uuid::new_v4(),
            hotel_id,
            info_type: contact.info_type,
            info_content: contact.info_content,
        };
        hotel.contact_infos.push(contact.clone());
        Ok(contact)
    }

    async fn remove_contact(&self, hotel_id: Uuid, contact_id: Uuid) -> Result<(), StoreError> {
        let mut hotels = self.hotels.lock().unwrap();
        let not_found = StoreError::NotFound {
            entity: "contact",
            id: contact_id,
        };
        let Some(hotel) = hotels.iter_mut().find(|h| h.id == hotel_id) else {
            return Err(not_found);
        };
        let before = hotel.contact_infos.len();
        hotel.contact_infos.retain(|c| c.id != contact_id);
        if hotel.contact_infos.len() == before {
            return Err(not_found);
        }
        Ok(())
    }

    async fn list_hotels(&self) -> Result<Vec<Hotel>, StoreError> {
        Ok(self.hotels.lock().unwrap().clone())
    }

    async fn list_officials(&self) -> Result<Vec<HotelOfficial>, StoreError> {
        Ok(self
            .hotels
            .lock()
            .unwrap()
            .iter()
            .map(|h| HotelOfficial {
                owner_name: h.owner_name.clone(),
                owner_surname: h.owner_surname.clone(),
                company_title: h.company_title.clone(),
            })
            .collect())
    }

    async fn get_hotel(&self, id: Uuid) -> Result<Option<Hotel>, StoreError> {
        Ok(self
            .hotels
            .lock()
            .unwrap()
            .iter()
            .find(|h| h.id == id)
            .cloned())
    }

    async fn location_stats(&self, location: &str) -> Result<LocationStats, StoreError> {
        Ok(LocationStats::for_location(
            self.hotels.lock().unwrap().iter(),
            location,
        ))
    }
}

/// Health probe with a fixed answer.
pub struct StaticProbe {
    pub name: &'static str,
    pub healthy: bool,
}

#[async_trait]
impl HealthProbe for StaticProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn ping(&self) -> Result<(), String> {
        if self.healthy {
            Ok(())
        } else {
            Err("unreachable".to_string())
        }
    }
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_app(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });

    format!("http://{addr}")
}

/// Poll the store until the report reaches `status` or the timeout passes.
pub async fn wait_for_status(
    reports: &InMemoryReportRepository,
    id: Uuid,
    status: ReportStatus,
    timeout: Duration,
) -> Option<Report> {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if let Some(report) = reports.get(id).filter(|r| r.status == status) {
            return Some(report);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    None
}
