use std::io::Write;

const BANNER: &str = concat!(
    "  |\\_/|        ****************************     (\\_/)\n",
    " / @ @ \\       *  \"Purrrfectly pleasant\"  *    (='.'=)\n",
    "( > º < )      *                              *    (\")_(\")\n",
    " `>>x<<´      *                               *\n",
    " /  O  \\     *********************************\n\n",
);

/// Print the decorative banner. Runs in-process; no child is created.
pub(crate) fn print_banner(stdout: &mut dyn Write) -> std::io::Result<()> {
    stdout.write_all(BANNER.as_bytes())?;
    stdout.flush()
}
