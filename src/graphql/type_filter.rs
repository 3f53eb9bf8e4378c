use super::naming::runtime_crate;
use proc_macro2::TokenStream;
use quote::quote;

/// Generic per-column operator input, one concrete GraphQL type per filter
/// value type.
pub fn generate_type_filter() -> TokenStream {
    let rt = runtime_crate();

    quote! {
        #[derive(async_graphql::InputObject, Clone, Debug, Default)]
        #[graphql(concrete(name = "IntFilter", params(i32)))]
        #[graphql(concrete(name = "BigIntFilter", params(i64)))]
        #[graphql(concrete(name = "FloatFilter", params(f64)))]
        #[graphql(concrete(name = "BooleanFilter", params(bool)))]
        #[graphql(concrete(name = "StringFilter", params(String)))]
        #[graphql(concrete(name = "UuidFilter", params(uuid::Uuid)))]
        pub struct TypeFilter<T: async_graphql::InputType> {
            pub eq: Option<T>,
            pub gt: Option<T>,
            pub lt: Option<T>,
            pub gte: Option<T>,
            pub lte: Option<T>,
        }

        impl<T> TypeFilter<T>
        where
            T: async_graphql::InputType + Into<#rt::sql::Value>,
        {
            /// Operators are applied in declaration order; the last one set wins.
            pub fn into_column_filter(self) -> #rt::filter::ColumnFilter {
                let mut filter = #rt::filter::ColumnFilter::default();
                let operators = [
                    (#rt::filter::FilterOp::Eq, self.eq),
                    (#rt::filter::FilterOp::Gt, self.gt),
                    (#rt::filter::FilterOp::Lt, self.lt),
                    (#rt::filter::FilterOp::Gte, self.gte),
                    (#rt::filter::FilterOp::Lte, self.lte),
                ];
                for (op, value) in operators {
                    if let Some(value) = value {
                        filter.set(op, value);
                    }
                }
                filter
            }
        }
    }
}
