//! Typed wrappers for every backend endpoint the harness exercises.
//!
//! Each submodule adds methods to [`ApiClient`](crate::ApiClient) for one
//! area of the API, together with the request and response schemas it uses.
//! Every method takes the session explicitly; pass `None` for anonymous calls.
//!
//! | Module | Paths |
//! |--------|-------|
//! | [`auth`] | `/auth/*`, `/users/me` |
//! | [`menu`] | `/menu/*`, `/admin/menu/*` |
//! | [`cart`] | `/cart/*` |
//! | [`orders`] | `/orders*`, `/admin/orders/*` |
//! | [`promo`] | `/promo/validate`, `/admin/promo/*` |
//! | [`integrations`] | `/admin/integrations/*`, `/admin/push/send`, `/devices/register`, `/maps/*` |
//! | [`analytics`] | `/admin/analytics*` |
//! | [`banners`] | `/admin/banners*` |
//! | [`business_hours`] | `/admin/business-hours*` |

pub mod analytics;
pub mod auth;
pub mod banners;
pub mod business_hours;
pub mod cart;
pub mod integrations;
pub mod menu;
pub mod orders;
pub mod promo;

pub use analytics::*;
pub use auth::*;
pub use banners::*;
pub use business_hours::*;
pub use cart::*;
pub use integrations::*;
pub use menu::*;
pub use orders::*;
pub use promo::*;

use secrecy::{ExposeSecret, SecretString};
use serde::Serializer;

/// Serialize a secret as a plain string inside an outgoing payload.
fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Percent-encode one path segment.
fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}
