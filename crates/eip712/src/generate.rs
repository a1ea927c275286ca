use indexmap::{map::Entry, IndexMap};

use crate::{MemberVariable, Struct, StructName, TypeDefinition, TypeRef, Types, Value};

#[derive(Debug, thiserror::Error)]
pub enum TypesGenerationError {
    #[error("Array inconsistency: expected type {0} under property: {1}")]
    ArrayInconsistency(String, String),
    #[error("Nested arrays are not supported. Property: {0}")]
    NestedArray(String),
    #[error("Conflicting definitions for type: {0}")]
    TypeConflict(StructName),
}

impl Types {
    /// Infer EIP-712 types from a document.
    ///
    /// Members are typed in the order they appear in the document. Every
    /// nested object becomes its own structure, named after the property
    /// holding it, and is registered before the structure referencing it.
    /// The document itself is described by `primary_type`.
    ///
    /// See: <https://w3c-ccg.github.io/ethereum-eip712-signature-2021-spec/#types-generation>
    pub fn generate(doc: &Struct, primary_type: StructName) -> Result<Self, TypesGenerationError> {
        let mut generator = TypesGenerator::default();
        let root = generator.infer_struct(doc)?;
        generator.register(primary_type, root)?;
        Ok(Self {
            eip712_domain: TypeDefinition::credential_domain(),
            types: generator.types,
        })
    }
}

#[derive(Default)]
struct TypesGenerator {
    types: IndexMap<StructName, TypeDefinition>,
}

impl TypesGenerator {
    fn infer_struct(&mut self, object: &Struct) -> Result<TypeDefinition, TypesGenerationError> {
        let mut definition = TypeDefinition::default();
        for (property_name, value) in object {
            let type_ = self.infer_member(property_name, value)?;
            definition.push(MemberVariable::new(property_name.clone(), type_));
        }
        Ok(definition)
    }

    fn infer_member(
        &mut self,
        property_name: &str,
        value: &Value,
    ) -> Result<TypeRef, TypesGenerationError> {
        match value {
            Value::Array(array) => {
                let element_type = self.infer_array_element(property_name, array)?;
                Ok(TypeRef::Array(Box::new(element_type)))
            }
            Value::Struct(object) => {
                let definition = self.infer_struct(object)?;
                let name = property_to_struct_name(property_name);
                self.register(name.clone(), definition)?;
                Ok(TypeRef::Struct(name))
            }
            primitive => Ok(primitive_type(primitive)),
        }
    }

    /// The first element elects the type of the whole array.
    fn infer_array_element(
        &mut self,
        property_name: &str,
        array: &[Value],
    ) -> Result<TypeRef, TypesGenerationError> {
        let mut values = array.iter();
        let first_value = match values.next() {
            Some(value) => value,
            // Nothing to infer from.
            None => return Ok(TypeRef::String),
        };
        match first_value {
            Value::Array(_) => Err(TypesGenerationError::NestedArray(property_name.to_owned())),
            Value::Struct(first) => {
                let definition = self.infer_struct(first)?;
                for value in values {
                    let consistent = match value {
                        Value::Struct(object) => self.infer_struct(object)? == definition,
                        _ => false,
                    };
                    if !consistent {
                        return Err(TypesGenerationError::ArrayInconsistency(
                            property_to_struct_name(property_name),
                            property_name.to_owned(),
                        ));
                    }
                }
                let name = property_to_struct_name(property_name);
                self.register(name.clone(), definition)?;
                Ok(TypeRef::Struct(name))
            }
            primitive => {
                let type_ = primitive_type(primitive);
                for value in values {
                    let consistent = !matches!(value, Value::Struct(_) | Value::Array(_))
                        && primitive_type(value) == type_;
                    if !consistent {
                        return Err(TypesGenerationError::ArrayInconsistency(
                            type_.to_string(),
                            property_name.to_owned(),
                        ));
                    }
                }
                Ok(type_)
            }
        }
    }

    /// Adds a structure definition, refusing to replace a different
    /// definition already registered under the same name.
    fn register(
        &mut self,
        name: StructName,
        definition: TypeDefinition,
    ) -> Result<(), TypesGenerationError> {
        match self.types.entry(name) {
            Entry::Vacant(entry) => {
                entry.insert(definition);
                Ok(())
            }
            Entry::Occupied(entry) if *entry.get() == definition => Ok(()),
            Entry::Occupied(entry) => Err(TypesGenerationError::TypeConflict(entry.key().clone())),
        }
    }
}

fn primitive_type(value: &Value) -> TypeRef {
    match value {
        Value::Bool(_) => TypeRef::Bool,
        Value::Integer(int) if *int < 0 => TypeRef::IntN(256),
        Value::Integer(_) => TypeRef::UintN(256),
        Value::Bytes(_) => TypeRef::Bytes,
        _ => TypeRef::String,
    }
}

fn property_to_struct_name(property_name: &str) -> StructName {
    // CamelCase
    let mut chars = property_name.chars();
    let first_char = chars.next().unwrap_or_default();
    first_char.to_uppercase().chain(chars).collect()
}
