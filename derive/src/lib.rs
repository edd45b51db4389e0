mod record;

use proc_macro::TokenStream;

/// Implements `rowbind::Decode` and `rowbind::Encode` for a struct.
///
/// - Decoding reads the fields in declared order from consecutive columns.
/// - Encoding at an index fills consecutive parameters in declared order.
/// - Encoding as arguments binds named-field structs by parameter name
///   (`:field`, or `#[record(rename = "...")]`), and tuple structs positionally.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream { record::derive_record_impl(input) }
