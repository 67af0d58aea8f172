// mercado/src/catalog/seed.rs

//! The demo catalog synthesized when an origin has no snapshot yet.

use crate::model::{Contact, Product, ProductId};
use rand::Rng;

struct LegacyListing {
  id: &'static str,
  name: &'static str,
  description: &'static str,
  price: f64,
  discount: u32,
  image: &'static str,
  category: &'static str,
  location: &'static str,
  publish_date: &'static str,
  seller_name: &'static str,
  seller_member_since: &'static str,
  whatsapp: &'static str,
}

const LISTINGS: &[LegacyListing] = &[
  LegacyListing {
    id: "1",
    name: "Café Serrano 250g",
    description: "Café molido de Sierra Maestra, tueste medio.",
    price: 850.0,
    discount: 0,
    image: "/products/cafe-serrano.jpg",
    category: "Alimentos",
    location: "Camagüey",
    publish_date: "2024-03-01",
    seller_name: "Yudith Pérez",
    seller_member_since: "2022",
    whatsapp: "+5352110001",
  },
  LegacyListing {
    id: "2",
    name: "Aceite de girasol 1L",
    description: "Aceite vegetal refinado.",
    price: 1100.0,
    discount: 5,
    image: "/products/aceite.jpg",
    category: "Alimentos",
    location: "Camagüey",
    publish_date: "2024-03-02",
    seller_name: "Yudith Pérez",
    seller_member_since: "2022",
    whatsapp: "+5352110001",
  },
  LegacyListing {
    id: "3",
    name: "Detergente en polvo 1kg",
    description: "Para lavado a mano y lavadora.",
    price: 650.0,
    discount: 0,
    image: "/products/detergente.jpg",
    category: "Aseo",
    location: "Florida",
    publish_date: "2024-03-04",
    seller_name: "Osmany Ruiz",
    seller_member_since: "2021",
    whatsapp: "+5352110002",
  },
  LegacyListing {
    id: "4",
    name: "Jabón de baño (pack 3)",
    description: "Jabón perfumado, tres unidades.",
    price: 450.0,
    discount: 10,
    image: "/products/jabon.jpg",
    category: "Aseo",
    location: "Florida",
    publish_date: "2024-03-05",
    seller_name: "Osmany Ruiz",
    seller_member_since: "2021",
    whatsapp: "+5352110002",
  },
  LegacyListing {
    id: "5",
    name: "Ventilador recargable",
    description: "Ventilador de 12 pulgadas con batería y luz LED.",
    price: 9500.0,
    discount: 0,
    image: "/products/ventilador.jpg",
    category: "Electrodomésticos",
    location: "Camagüey",
    publish_date: "2024-03-08",
    seller_name: "Lázaro Gómez",
    seller_member_since: "2023",
    whatsapp: "+5352110003",
  },
  LegacyListing {
    id: "6",
    name: "Olla arrocera 1.8L",
    description: "Olla eléctrica con función de mantener caliente.",
    price: 7800.0,
    discount: 0,
    image: "/products/arrocera.jpg",
    category: "Electrodomésticos",
    location: "Nuevitas",
    publish_date: "2024-03-09",
    seller_name: "Lázaro Gómez",
    seller_member_since: "2023",
    whatsapp: "+5352110003",
  },
  LegacyListing {
    id: "7",
    name: "Pomo de miel 500ml",
    description: "Miel de abeja natural.",
    price: 700.0,
    discount: 0,
    image: "/products/miel.jpg",
    category: "Alimentos",
    location: "Sibanicú",
    publish_date: "2024-03-11",
    seller_name: "Mercedes Díaz",
    seller_member_since: "2020",
    whatsapp: "+5352110004",
  },
  LegacyListing {
    id: "8",
    name: "Cargador USB-C 20W",
    description: "Carga rápida, cable incluido.",
    price: 2200.0,
    discount: 15,
    image: "/products/cargador.jpg",
    category: "Electrónica",
    location: "Camagüey",
    publish_date: "2024-03-12",
    seller_name: "Daniel Castro",
    seller_member_since: "2024",
    whatsapp: "+5352110005",
  },
];

/// Wraps each legacy single-image listing into a product with a one-element
/// `images` list, a pseudo-random stock in `1..=20` and `is_visible = true`.
pub fn default_catalog<R: Rng + ?Sized>(now: i64, rng: &mut R) -> Vec<Product> {
  LISTINGS
    .iter()
    .map(|l| Product {
      id: ProductId::from(l.id),
      name: l.name.to_string(),
      description: l.description.to_string(),
      category: l.category.to_string(),
      location: l.location.to_string(),
      price: l.price,
      discount: l.discount,
      images: vec![l.image.to_string()],
      image: l.image.to_string(),
      stock: rng.gen_range(1..=20),
      is_visible: true,
      created_at: now,
      updated_at: now,
      publish_date: Some(l.publish_date.to_string()),
      seller_name: l.seller_name.to_string(),
      seller_avatar: String::new(),
      seller_member_since: l.seller_member_since.to_string(),
      contact: Contact::Whatsapp {
        number: l.whatsapp.to_string(),
      },
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  #[test]
  fn test_seed_products_are_stocked_visible_and_imaged() {
    let products = default_catalog(5, &mut StdRng::seed_from_u64(1));
    assert_eq!(products.len(), LISTINGS.len());
    for p in &products {
      assert!((1..=20).contains(&p.stock));
      assert!(p.is_visible);
      assert_eq!(p.images.len(), 1);
      assert_eq!(p.primary_image(), Some(p.image.as_str()));
    }
  }
}
