//! Hotel stay billing and invoice PDF generation.
//!
//! A [`model::StayForm`] collects the guest, the stay dates and the booked rooms with their food
//! packages.  [`billing::compute`] derives per-line charges and the grand total, and
//! [`export::Exporter`] renders the invoice to a PDF named after the guest.

pub mod billing;
pub mod builder;
pub mod elements;
pub mod error;
pub mod export;
pub mod fonts;
pub mod form;
pub mod invoice;
pub mod layout;
pub mod model;
pub mod profile;
pub mod raster;
pub mod richtext;

pub use error::{ExportError, Result};
pub use export::{pdf_file_name, Exporter};
pub use form::FormError;
pub use invoice::{Invoice, InvoiceNumber};
pub use model::{FoodEntry, FoodType, Guest, RoomEntry, RoomType, StayForm};
pub use profile::HotelProfile;
