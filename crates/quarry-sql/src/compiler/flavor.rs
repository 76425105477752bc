use super::Compiler;

use quarry_core::{driver::Capability, Schema};

impl<'a> Compiler<'a> {
    pub fn new(schema: &'a Schema, capability: &'static Capability) -> Compiler<'a> {
        Compiler { schema, capability }
    }

    pub fn sqlite(schema: &'a Schema) -> Compiler<'a> {
        Compiler::new(schema, &Capability::SQLITE)
    }

    pub fn mysql(schema: &'a Schema) -> Compiler<'a> {
        Compiler::new(schema, &Capability::MYSQL)
    }

    pub fn cql(schema: &'a Schema) -> Compiler<'a> {
        Compiler::new(schema, &Capability::CQL)
    }
}
