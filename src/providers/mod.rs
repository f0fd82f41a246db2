//! AI provider adapters
//!
//! Each [`ProviderAdapter`] turns a profile plus a [`ChatPrompt`] into a
//! provider-specific HTTP request and extracts the topic from the reply.
//! [`AdapterRegistry`] picks the adapter by profile id:
//!
//! | id                           | adapter                 | auth                    |
//! |------------------------------|-------------------------|-------------------------|
//! | `openai`, `deepseek`, `guiji`| [`OpenAiCompatible`]    | `Authorization: Bearer` |
//! | `azure`                      | [`AzureAdapter`]        | `api-key`               |
//! | `baidu`                      | [`TokenExchangeAdapter`]| client credentials      |
//! | anything else                | `OpenAiCompatible::custom` | `Authorization: Bearer` |

mod azure;
mod http;
mod openai;
mod registry;
mod response;
mod token_exchange;
mod traits;
mod types;

pub use azure::AzureAdapter;
pub use http::HttpClient;
pub use openai::OpenAiCompatible;
pub use registry::AdapterRegistry;
pub use response::extract_topic;
pub use token_exchange::{BAIDU_TOKEN_URL, TokenExchangeAdapter};
pub use traits::ProviderAdapter;
pub use types::{ChatPrompt, ProviderError, ProviderRequest, Result};
