use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::Lit::{Int, Str};
use syn::NestedMeta::Meta;
use syn::{parse_macro_input, parse_quote, DeriveInput, GenericParam, Lifetime, LifetimeDef};
use syn::{
    Meta::{List, NameValue},
    MetaList, MetaNameValue,
};

struct TlvArgs {
    start: u8,
    datatype: String,
    lifetime: Option<syn::Lifetime>,
}

impl Default for TlvArgs {
    fn default() -> Self {
        Self {
            start: 0,
            datatype: "struct".to_string(),
            lifetime: None,
        }
    }
}

fn parse_tlvargs(ast: &DeriveInput) -> syn::Result<TlvArgs> {
    let mut tlvargs: TlvArgs = Default::default();

    for attr in ast.attrs.iter().filter(|a| a.path.is_ident("tlvargs")) {
        let nested = match attr.parse_meta()? {
            List(MetaList { nested, .. }) => nested,
            other => return Err(syn::Error::new_spanned(other, "expected tlvargs(...)")),
        };
        for a in nested {
            let (key_path, key_val) = match a {
                Meta(NameValue(MetaNameValue { path, lit, .. })) => (path, lit),
                other => return Err(syn::Error::new_spanned(other, "unsupported tlvargs entry")),
            };
            if key_path.is_ident("start") {
                if let Int(litint) = &key_val {
                    tlvargs.start = litint.base10_parse::<u8>()?;
                    continue;
                }
            } else if key_path.is_ident("lifetime") {
                if let Str(litstr) = &key_val {
                    tlvargs.lifetime = Some(Lifetime::new(&litstr.value(), Span::call_site()));
                    continue;
                }
            } else if key_path.is_ident("datatype") {
                if let Str(litstr) = &key_val {
                    let datatype = litstr.value();
                    if datatype == "struct" || datatype == "list" {
                        tlvargs.datatype = datatype;
                        continue;
                    }
                }
            }
            return Err(syn::Error::new_spanned(key_val, "unsupported tlvargs value"));
        }
    }
    Ok(tlvargs)
}

fn named_fields(ast: &DeriveInput) -> syn::Result<Vec<&syn::Field>> {
    if let syn::Data::Struct(syn::DataStruct {
        fields: syn::Fields::Named(ref fields),
        ..
    }) = ast.data
    {
        Ok(fields.named.iter().collect())
    } else {
        Err(syn::Error::new_spanned(
            &ast.ident,
            "TLV derive only supports structs with named fields",
        ))
    }
}

fn type_params(generics: &syn::Generics) -> Vec<&syn::Ident> {
    generics.type_params().map(|t| &t.ident).collect()
}

fn context_tags(start: u8, count: usize) -> syn::Result<Vec<u8>> {
    (0..count)
        .map(|i| {
            u8::try_from(start as usize + i).map_err(|_| {
                syn::Error::new(Span::call_site(), "too many fields for context tags")
            })
        })
        .collect()
}

/// Derive ToTLV Macro
///
/// This macro works for structures. It will create an implementation
/// of the ToTLV trait for that structure.  All the members of the
/// structure, sequentially, will get Context tags starting from 0
/// Some configurations are possible through the 'tlvargs' attributes.
/// For example:
///  #[tlvargs(start = 1, datatype = "list")]
///
/// start: This can be used to override the default tag from which the
///        encoding starts (Default: 0)
/// datatype: This can be used to define whether this data structure is
///        to be encoded as a structure or list. Possible values: list
///        (Default: struct)
#[proc_macro_derive(ToTLV, attributes(tlvargs))]
pub fn derive_totlv(item: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(item as DeriveInput);
    expand_totlv(&ast)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn expand_totlv(ast: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &ast.ident;
    let tlvargs = parse_tlvargs(ast)?;
    let start = format_ident!("start_{}", tlvargs.datatype);
    let end = format_ident!("end_{}", tlvargs.datatype);
    let mut generics = ast.generics.clone();
    for ident in type_params(&ast.generics) {
        generics
            .make_where_clause()
            .predicates
            .push(parse_quote!(#ident: ::chip_tlv::tlv::ToTLV));
    }
    let (impl_generics, _, where_clause) = generics.split_for_impl();
    let ty_generics = ast.generics.split_for_impl().1;

    let fields = named_fields(ast)?;
    let idents: Vec<_> = fields.iter().map(|f| &f.ident).collect();
    let tags = context_tags(tlvargs.start, fields.len())?;

    Ok(quote! {
        impl #impl_generics ::chip_tlv::tlv::ToTLV for #struct_name #ty_generics #where_clause {
            fn to_tlv(
                &self,
                tw: &mut ::chip_tlv::tlv::TLVWriter,
                tag_type: ::chip_tlv::tlv::TagType,
            ) -> Result<(), ::chip_tlv::error::Error> {
                tw.#start(tag_type)?;
                #(
                    ::chip_tlv::tlv::ToTLV::to_tlv(
                        &self.#idents,
                        tw,
                        ::chip_tlv::tlv::TagType::Context(#tags),
                    )?;
                )*
                tw.#end()
            }
        }
    })
}

/// Derive FromTLV Macro
///
/// This macro works for structures. It will create an implementation
/// of the FromTLV trait for that structure.  All the members of the
/// structure, sequentially, will get Context tags starting from 0
/// Some configurations are possible through the 'tlvargs' attributes.
/// For example:
///  #[tlvargs(lifetime = "'a", start = 1, datatype = "list")]
///
/// start: This can be used to override the default tag from which the
///        decoding starts (Default: 0)
/// datatype: This can be used to define whether this data structure is
///        to be decoded as a structure or list. Possible values: list
///        (Default: struct)
/// lifetime: If the structure has a lifetime annotation, use this variable
///        to indicate that. The 'impl' will then use that lifetime
///        indicator.
///
/// The decoder expects the tags in sequentially increasing order. A field
/// whose tag is not under the cursor is reported as not found, which is
/// only acceptable for Option<T> fields. Unknown trailing members are
/// skipped.
#[proc_macro_derive(FromTLV, attributes(tlvargs))]
pub fn derive_fromtlv(item: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(item as DeriveInput);
    expand_fromtlv(&ast)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn expand_fromtlv(ast: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &ast.ident;
    let tlvargs = parse_tlvargs(ast)?;
    let enter = format_ident!("enter_{}", tlvargs.datatype);

    let fields = named_fields(ast)?;
    let idents: Vec<_> = fields.iter().map(|f| &f.ident).collect();
    let types: Vec<_> = fields.iter().map(|f| &f.ty).collect();
    let tags = context_tags(tlvargs.start, fields.len())?;

    // Borrowed fields tie the decoded value to the input buffer
    let lifetime = tlvargs
        .lifetime
        .or_else(|| ast.generics.lifetimes().next().map(|l| l.lifetime.clone()))
        .unwrap_or_else(|| Lifetime::new("'__tlv", Span::call_site()));
    let mut generics = ast.generics.clone();
    if generics.lifetimes().all(|l| l.lifetime != lifetime) {
        generics
            .params
            .insert(0, GenericParam::Lifetime(LifetimeDef::new(lifetime.clone())));
    }
    for ident in type_params(&ast.generics) {
        generics
            .make_where_clause()
            .predicates
            .push(parse_quote!(#ident: ::chip_tlv::tlv::FromTLV<#lifetime>));
    }
    let (impl_generics, _, where_clause) = generics.split_for_impl();
    let ty_generics = ast.generics.split_for_impl().1;

    Ok(quote! {
        impl #impl_generics ::chip_tlv::tlv::FromTLV<#lifetime> for #struct_name #ty_generics
        #where_clause
        {
            fn from_tlv(
                tr: &mut ::chip_tlv::tlv::TLVReader<#lifetime>,
                tag_type: ::chip_tlv::tlv::TagType,
            ) -> Result<Self, ::chip_tlv::error::Error> {
                tr.#enter(tag_type)?;
                #(
                    let tag = ::chip_tlv::tlv::TagType::Context(#tags);
                    let #idents = match tr.peek_element() {
                        Ok(header) if header.tag == tag => {
                            <#types as ::chip_tlv::tlv::FromTLV<#lifetime>>::from_tlv(tr, tag)
                        }
                        Ok(_) | Err(::chip_tlv::error::Error::EndOfContainer) => {
                            <#types as ::chip_tlv::tlv::FromTLV<#lifetime>>::tlv_not_found()
                        }
                        Err(e) => Err(e),
                    }?;
                )*
                tr.exit_container()?;

                Ok(Self {
                    #(#idents,
                    )*
                })
            }
        }
    })
}
