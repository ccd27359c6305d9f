//! The rental domain: one Sea-ORM entity, one DTO and (except for customers)
//! one criteria type per table.
//!
//! Foreign keys (`brandId`, `carId`, ...) are plain identifiers. Nothing
//! navigates or enforces them.

pub mod brand;
pub mod car;
pub mod car_image;
pub mod color;
pub mod customer;
pub mod rental;

pub use brand::{BrandCriteria, BrandDto};
pub use car::{CarCriteria, CarDto};
pub use car_image::{CarImageCriteria, CarImageDto};
pub use color::{ColorCriteria, ColorDto};
pub use customer::CustomerDto;
pub use rental::{RentalCriteria, RentalDto};
