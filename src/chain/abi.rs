#![forbid(unsafe_code)]

use alloy_sol_types::sol;

sol! {
    function name() external view returns (string);
    function tokenURI(uint256 tokenId) external view returns (string);
    function ownerOf(uint256 tokenId) external view returns (address);

    function balanceOf(address account) external view returns (uint256);
    function allowance(address owner, address spender) external view returns (uint256);
    function approve(address spender, uint256 amount) external returns (bool);

    function getListing(address nftAddress, uint256 tokenId) external view returns (uint256 price, address seller);
    function buyMany(address nftAddress, uint256[] tokenIds) external;
    function offerMany(address nftAddress, uint256[] tokenIds, uint256[] prices) external;
    function cancelListing(address nftAddress, uint256 tokenId) external;
}
