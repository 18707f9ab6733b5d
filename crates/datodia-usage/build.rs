fn main() -> Result<(), Box<dyn std::error::Error>> {
    datodia_codegen::configure().compile("src")?;
    Ok(())
}
