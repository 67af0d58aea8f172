// mercado/src/order/delivery.rs

//! Delivery neighbourhoods and their flat fees.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryBand {
  Near,
  Medium,
  Far,
  VeryFar,
}

impl DeliveryBand {
  pub fn eta(&self) -> &'static str {
    match self {
      DeliveryBand::Near => "10-15 min",
      DeliveryBand::Medium => "15-25 min",
      DeliveryBand::Far => "25-40 min",
      DeliveryBand::VeryFar => "40+ min",
    }
  }
}

impl fmt::Display for DeliveryBand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      DeliveryBand::Near => "near",
      DeliveryBand::Medium => "medium",
      DeliveryBand::Far => "far",
      DeliveryBand::VeryFar => "very far",
    };
    f.write_str(label)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeliveryZone {
  pub id: &'static str,
  pub name: &'static str,
  pub price: f64,
  pub band: DeliveryBand,
}

const fn zone(id: &'static str, name: &'static str, price: f64, band: DeliveryBand) -> DeliveryZone {
  DeliveryZone { id, name, price, band }
}

static ZONES: [DeliveryZone; 27] = [
  zone("la-rubia", "La Rubia", 200.0, DeliveryBand::Near),
  zone("palomino", "Palomino", 200.0, DeliveryBand::Near),
  zone("el-modelo", "El Modelo", 200.0, DeliveryBand::Near),
  zone("el-porvenir", "El Porvenir", 200.0, DeliveryBand::Near),
  zone("simoni", "Simoni", 200.0, DeliveryBand::Near),
  zone("agramonte", "Agramonte", 200.0, DeliveryBand::Near),
  zone("previsora", "Previsora", 200.0, DeliveryBand::Near),
  zone("centro-pueblo", "Centro del Pueblo", 300.0, DeliveryBand::Medium),
  zone("la-vigia", "La Vigía", 300.0, DeliveryBand::Medium),
  zone("la-caridad", "La Caridad", 300.0, DeliveryBand::Medium),
  zone("vista-hermosa", "Vista Hermosa", 300.0, DeliveryBand::Medium),
  zone("torre-blanca", "Torre Blanca Garrido", 300.0, DeliveryBand::Medium),
  zone("saratoga", "Saratoga", 300.0, DeliveryBand::Medium),
  zone("la-guernica", "La Guernica", 300.0, DeliveryBand::Medium),
  zone("puerto-principe", "Puerto Príncipe", 350.0, DeliveryBand::Far),
  zone("nitrogeno", "Nitrógeno", 350.0, DeliveryBand::Far),
  zone("amalia-eden", "Amalia Eden", 350.0, DeliveryBand::Far),
  zone("plaza-mendez", "Plaza de Méndez", 350.0, DeliveryBand::Far),
  zone("los-coquitos", "Los Coquitos", 400.0, DeliveryBand::Far),
  zone("lenin", "Lenin", 450.0, DeliveryBand::VeryFar),
  zone("albaiza", "Albaiza", 450.0, DeliveryBand::VeryFar),
  zone("juruquey", "Juruquey", 450.0, DeliveryBand::VeryFar),
  zone("bella-vista", "Bella Vista", 450.0, DeliveryBand::VeryFar),
  zone("el-corojo", "El Corojo", 500.0, DeliveryBand::VeryFar),
  zone("monte-carlos", "Monte Carlos", 500.0, DeliveryBand::VeryFar),
  zone("villa-mariana", "Villa Mariana", 500.0, DeliveryBand::VeryFar),
  zone("jayama", "Jayamá", 500.0, DeliveryBand::VeryFar),
];

pub fn delivery_zones() -> &'static [DeliveryZone] {
  &ZONES
}

pub fn find_zone(id: &str) -> Option<&'static DeliveryZone> {
  ZONES.iter().find(|zone| zone.id == id)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn test_zone_ids_are_unique_and_fees_follow_bands() {
    let ids: HashSet<_> = delivery_zones().iter().map(|z| z.id).collect();
    assert_eq!(ids.len(), 27);
    for zone in delivery_zones() {
      let range = match zone.band {
        DeliveryBand::Near => 200.0..=200.0,
        DeliveryBand::Medium => 300.0..=300.0,
        DeliveryBand::Far => 350.0..=400.0,
        DeliveryBand::VeryFar => 450.0..=500.0,
      };
      assert!(range.contains(&zone.price), "{} has fee {}", zone.id, zone.price);
    }
  }

  #[test]
  fn test_lookup_by_id() {
    assert_eq!(find_zone("jayama").map(|z| z.price), Some(500.0));
    assert!(find_zone("atlantis").is_none());
  }
}
