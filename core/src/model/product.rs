// mercado/src/model/product.rs

//! The `Product` record and the input shapes used to create and edit it.
//!
//! Wire names are camelCase so a snapshot written by any storefront context can be
//! read by any other.

use crate::error::{MercadoError, MercadoResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque product identifier. Assigned once at creation, never edited.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ProductId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for ProductId {
  fn from(value: &str) -> Self {
    ProductId(value.to_string())
  }
}

impl From<String> for ProductId {
  fn from(value: String) -> Self {
    ProductId(value)
  }
}

/// How buyers reach the seller. Exactly one handle is carried, matching the type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "contactType", rename_all = "lowercase")]
pub enum Contact {
  Whatsapp {
    #[serde(rename = "contactNumber")]
    number: String,
  },
  Telegram {
    #[serde(rename = "contactUsername")]
    username: String,
  },
}

impl Contact {
  pub fn handle(&self) -> &str {
    match self {
      Contact::Whatsapp { number } => number,
      Contact::Telegram { username } => username,
    }
  }
}

fn visible_by_default() -> bool {
  true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: ProductId,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub location: String,
  pub price: f64,
  /// Percentage, display only.
  #[serde(default)]
  pub discount: u32,
  /// Ordered; index 0 is the primary image.
  #[serde(default)]
  pub images: Vec<String>,
  /// Legacy mirror of `images[0]`. Never edited on its own.
  #[serde(default)]
  pub image: String,
  pub stock: u32,
  #[serde(default = "visible_by_default")]
  pub is_visible: bool,
  #[serde(default)]
  pub created_at: i64,
  #[serde(default)]
  pub updated_at: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub publish_date: Option<String>,
  #[serde(default)]
  pub seller_name: String,
  #[serde(default)]
  pub seller_avatar: String,
  #[serde(default)]
  pub seller_member_since: String,
  #[serde(flatten)]
  pub contact: Contact,
}

impl Product {
  pub fn primary_image(&self) -> Option<&str> {
    self.images.first().map(String::as_str)
  }

  /// Shown in the storefront and accepted into carts.
  pub fn is_purchasable(&self) -> bool {
    self.is_visible && self.stock > 0
  }

  /// Sets stock and re-derives visibility. Stock reaching zero always hides.
  pub(crate) fn set_stock(&mut self, stock: u32) {
    self.stock = stock;
    self.is_visible = stock > 0;
  }

  pub(crate) fn set_images(&mut self, images: Vec<String>) {
    self.images = images;
    if let Some(primary) = self.images.first() {
      self.image = primary.clone();
    }
  }

  /// Repairs records read from older snapshots: fills `images` from the legacy
  /// `image`, re-mirrors the primary image and hides zero-stock products.
  /// A manual hide of an in-stock product is kept.
  pub(crate) fn normalize(&mut self) {
    if self.images.is_empty() && !self.image.is_empty() {
      self.images.push(self.image.clone());
    }
    if let Some(primary) = self.images.first() {
      if self.image != *primary {
        self.image = primary.clone();
      }
    }
    if self.stock == 0 {
      self.is_visible = false;
    }
  }
}

/// Input for creating a product. Id, timestamps, visibility and the legacy
/// `image` mirror are assigned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub location: String,
  pub price: f64,
  #[serde(default)]
  pub discount: u32,
  pub images: Vec<String>,
  pub stock: u32,
  #[serde(default)]
  pub publish_date: Option<String>,
  #[serde(default)]
  pub seller_name: String,
  #[serde(default)]
  pub seller_avatar: String,
  #[serde(default)]
  pub seller_member_since: String,
  #[serde(flatten)]
  pub contact: Contact,
}

impl ProductDraft {
  /// Checks done at the creation boundary before a draft becomes a product.
  pub fn validate(&self) -> MercadoResult<()> {
    if self.name.trim().is_empty() {
      return Err(MercadoError::invalid("name must not be empty"));
    }
    validate_price(self.price)?;
    validate_images(&self.images)?;
    validate_contact(&self.contact)?;
    Ok(())
  }

  pub(crate) fn into_product(self, id: ProductId, now: i64) -> Product {
    let image = self.images.first().cloned().unwrap_or_default();
    Product {
      id,
      name: self.name,
      description: self.description,
      category: self.category,
      location: self.location,
      price: self.price,
      discount: self.discount,
      images: self.images,
      image,
      is_visible: self.stock > 0,
      stock: self.stock,
      created_at: now,
      updated_at: now,
      publish_date: self.publish_date,
      seller_name: self.seller_name,
      seller_avatar: self.seller_avatar,
      seller_member_since: self.seller_member_since,
      contact: self.contact,
    }
  }
}

/// Field edits for an existing product. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
  pub name: Option<String>,
  pub description: Option<String>,
  pub category: Option<String>,
  pub location: Option<String>,
  pub price: Option<f64>,
  pub discount: Option<u32>,
  pub images: Option<Vec<String>>,
  pub stock: Option<u32>,
  pub publish_date: Option<String>,
  pub seller_name: Option<String>,
  pub seller_avatar: Option<String>,
  pub seller_member_since: Option<String>,
  pub contact: Option<Contact>,
}

impl ProductPatch {
  pub fn is_empty(&self) -> bool {
    *self == ProductPatch::default()
  }

  pub(crate) fn validate(&self) -> MercadoResult<()> {
    if let Some(name) = &self.name {
      if name.trim().is_empty() {
        return Err(MercadoError::invalid("name must not be empty"));
      }
    }
    if let Some(price) = self.price {
      validate_price(price)?;
    }
    if let Some(images) = &self.images {
      validate_images(images)?;
    }
    if let Some(contact) = &self.contact {
      validate_contact(contact)?;
    }
    Ok(())
  }

  /// Merges the patch into `product`. Stock goes through `set_stock` so the
  /// visibility coupling holds.
  pub(crate) fn merge_into(self, product: &mut Product) {
    if let Some(v) = self.name {
      product.name = v;
    }
    if let Some(v) = self.description {
      product.description = v;
    }
    if let Some(v) = self.category {
      product.category = v;
    }
    if let Some(v) = self.location {
      product.location = v;
    }
    if let Some(v) = self.price {
      product.price = v;
    }
    if let Some(v) = self.discount {
      product.discount = v;
    }
    if let Some(v) = self.images {
      product.set_images(v);
    }
    if let Some(v) = self.stock {
      product.set_stock(v);
    }
    if let Some(v) = self.publish_date {
      product.publish_date = Some(v);
    }
    if let Some(v) = self.seller_name {
      product.seller_name = v;
    }
    if let Some(v) = self.seller_avatar {
      product.seller_avatar = v;
    }
    if let Some(v) = self.seller_member_since {
      product.seller_member_since = v;
    }
    if let Some(v) = self.contact {
      product.contact = v;
    }
  }
}

fn validate_price(price: f64) -> MercadoResult<()> {
  if !price.is_finite() || price < 0.0 {
    return Err(MercadoError::invalid(format!("price must be a non-negative amount, got {}", price)));
  }
  Ok(())
}

fn validate_images(images: &[String]) -> MercadoResult<()> {
  if images.is_empty() {
    return Err(MercadoError::invalid("at least one image is required"));
  }
  if images.iter().any(|i| i.trim().is_empty()) {
    return Err(MercadoError::invalid("image references must not be blank"));
  }
  Ok(())
}

fn validate_contact(contact: &Contact) -> MercadoResult<()> {
  if contact.handle().trim().is_empty() {
    let which = match contact {
      Contact::Whatsapp { .. } => "contact number",
      Contact::Telegram { .. } => "contact username",
    };
    return Err(MercadoError::invalid(format!("{} must not be empty", which)));
  }
  Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockSeverity {
  Critical,
  Warning,
  Normal,
}

/// Display classification of a stock quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockStatus {
  pub label: String,
  pub severity: StockSeverity,
}
