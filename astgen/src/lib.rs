use proc_macro::TokenStream;
use syn::{
    parse::{Parse, ParseStream, Result},
    punctuated::Punctuated,
    Ident, Token, Type,
};
use quote::quote;
use heck::ToSnakeCase;

/// Parses the following syntax:
/// ```text
/// generate_ast!(
///     $AST_NAME,
///     [$(NODE_NAME => { $($FIELD_NAME: $FIELD_TYPE),* });+]
/// )
/// ```
///
/// For example:
/// ```text
/// generate_ast!(
///     Expr,
///     [
///         Number => { value: isize };
///         Binary => { left: Box<Expr>, op: char, right: Box<Expr> };
///     ]
/// )
/// ```
///
/// This expands to a `pub enum Expr` with one tuple variant per node, a
/// `pub struct` per node, and a `new_<node>` constructor on the enum for each
/// variant. Consumers dispatch on the enum with `match`.
struct Ast {
    name: Ident,
    nodes: Punctuated<AstNode, Token![;]>,
}

impl Parse for Ast {
    fn parse(input: ParseStream) -> Result<Self> {
        let name: Ident = input.parse()?;
        input.parse::<Token![,]>()?;
        let nodes_input;
        syn::bracketed!(nodes_input in input);
        let nodes = nodes_input.parse_terminated(AstNode::parse, Token![;])?;
        Ok(Ast { name, nodes })
    }
}

struct AstNode {
    name: Ident,
    fields: Punctuated<Field, Token![,]>,
}

impl Parse for AstNode {
    fn parse(input: ParseStream) -> Result<Self> {
        let name: Ident = input.parse()?;
        input.parse::<Token![=>]>()?;
        let fields_input;
        syn::braced!(fields_input in input);
        let fields = fields_input.parse_terminated(Field::parse, Token![,])?;
        Ok(AstNode { name, fields })
    }
}

struct Field {
    name: Ident,
    ty: Type,
}

impl Parse for Field {
    fn parse(input: ParseStream) -> Result<Self> {
        let name: Ident = input.parse()?;
        input.parse::<Token![:]>()?;
        let ty: Type = input.parse()?;
        Ok(Field { name, ty })
    }
}

#[proc_macro]
pub fn generate_ast(input: TokenStream) -> TokenStream {
    let Ast {
        name,
        nodes,
    } = syn::parse_macro_input!(input);

    let node_names: Vec<_> = nodes.iter().map(|n| &n.name).collect();

    let ast_enum = quote! {
        #[derive(Clone, Debug, PartialEq)]
        pub enum #name {
            #(#node_names(#node_names)),*
        }
    };

    let node_structs = nodes.iter().map(|n| {
        let node_name = &n.name;
        let field_names = n.fields.iter().map(|f| &f.name);
        let field_types = n.fields.iter().map(|f| &f.ty);
        quote! {
            #[derive(Clone, Debug, PartialEq)]
            pub struct #node_name {
                #(pub #field_names: #field_types),*
            }
        }
    });

    let constructors = nodes.iter().map(|n| {
        let node_name = &n.name;
        let new_name = quote::format_ident!("new_{}", node_name.to_string().to_snake_case());
        let field_names: Vec<_> = n.fields.iter().map(|f| &f.name).collect();
        let field_types = n.fields.iter().map(|f| &f.ty);
        quote! {
            pub fn #new_name(#(#field_names: #field_types),*) -> Self {
                #name::#node_name(#node_name { #(#field_names),* })
            }
        }
    });

    (quote! {
        #ast_enum
        #(#node_structs)*

        impl #name {
            #(#constructors)*
        }
    }).into()
}
