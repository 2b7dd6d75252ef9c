//! Sample hotel directory content.

#![allow(dead_code)]

use hotel_guide::models::hotel::{ContactType, CreateHotelRequest, NewContactInfo};

fn contact(info_type: ContactType, info_content: &str) -> NewContactInfo {
    NewContactInfo {
        info_type,
        info_content: info_content.to_string(),
    }
}

/// A hotel at `location` carrying `phones` phone contacts and one email.
pub fn hotel_at(location: &str, title: &str, phones: usize) -> CreateHotelRequest {
    let mut contacts = vec![
        contact(ContactType::Location, location),
        contact(ContactType::Email, &format!("desk@{}.example", title.to_lowercase())),
    ];
    contacts.extend((0..phones).map(|i| contact(ContactType::Phone, &format!("+33 1 00 00 00 {i:02}"))));

    CreateHotelRequest {
        owner_name: "Jeanne".to_string(),
        owner_surname: "Martin".to_string(),
        company_title: title.to_string(),
        contacts,
    }
}

/// Ten hotels in Paris with five phone contacts between them, plus two
/// hotels elsewhere.
pub fn paris_directory() -> Vec<CreateHotelRequest> {
    let mut hotels: Vec<CreateHotelRequest> = (0..10)
        .map(|i| hotel_at("Paris", &format!("Paris{i}"), usize::from(i % 2 == 0)))
        .collect();
    hotels.push(hotel_at("Lyon", "Lyon0", 3));
    hotels.push(hotel_at("Nice", "Nice0", 1));
    hotels
}
