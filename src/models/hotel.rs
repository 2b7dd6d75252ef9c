use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of contact entry attached to a hotel.
///
/// `Location` entries place a hotel in a city or region; location reports
/// match on their content.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContactType {
    Phone,
    Email,
    Fax,
    Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub info_type: ContactType,
    pub info_content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: Uuid,
    pub owner_name: String,
    pub owner_surname: String,
    pub company_title: String,
    pub contact_infos: Vec<ContactInfo>,
}

/// Owner and company columns of a hotel, without contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelOfficial {
    pub owner_name: String,
    pub owner_surname: String,
    pub company_title: String,
}

/// Hotel and phone-contact counts for a location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationStats {
    pub hotel_count: i32,
    pub phone_count: i32,
}

impl LocationStats {
    /// Count the hotels placed at `location` and the phone contacts they carry.
    ///
    /// Same rule as the aggregation query in `PgHotelRepository::location_stats`,
    /// applied to hotels already in memory.
    pub fn for_location<'a>(hotels: impl IntoIterator<Item = &'a Hotel>, location: &str) -> Self {
        hotels
            .into_iter()
            .filter(|hotel| hotel.is_located_at(location))
            .fold(Self::default(), |stats, hotel| Self {
                hotel_count: stats.hotel_count.saturating_add(1),
                phone_count: stats
                    .phone_count
                    .saturating_add(hotel.count_contacts(ContactType::Phone)),
            })
    }
}

impl Hotel {
    pub fn is_located_at(&self, location: &str) -> bool {
        self.contact_infos
            .iter()
            .any(|c| c.info_type == ContactType::Location && c.info_content == location)
    }

    pub fn count_contacts(&self, kind: ContactType) -> i32 {
        let count = self
            .contact_infos
            .iter()
            .filter(|c| c.info_type == kind)
            .count();
        i32::try_from(count).unwrap_or(i32::MAX)
    }
}

/// Contact entry as submitted by a client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewContactInfo {
    #[garde(skip)]
    pub info_type: ContactType,

    #[garde(length(min = 1, max = 200))]
    pub info_content: String,
}

/// Body of `POST /hotels`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateHotelRequest {
    #[garde(length(max = 200))]
    pub owner_name: String,

    #[garde(length(max = 200))]
    pub owner_surname: String,

    #[garde(length(max = 200))]
    pub company_title: String,

    #[serde(default)]
    #[garde(dive)]
    pub contacts: Vec<NewContactInfo>,
}

/// Query string of `GET /hotels/stats`.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub location: String,
}
