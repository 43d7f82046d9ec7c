fn main() -> color_eyre::Result<()> {
	rkstudio_client::cli::main()
}
