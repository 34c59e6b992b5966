pub mod d400_branch_summary;
